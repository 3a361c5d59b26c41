//! Native device enumeration and name resolution.
//!
//! Nothing is cached: every call queries the subsystem again, since devices
//! can appear or disappear between two calls.

use std::sync::Arc;

use crate::device::runtime::AudioRuntime;
use crate::models::device::{DeviceIdentity, Direction};
use crate::models::error::AudioError;

/// Enumerates and resolves playback/recording devices.
#[derive(Debug, Clone)]
pub struct DeviceDirectory {
    runtime: Arc<AudioRuntime>,
}

impl DeviceDirectory {
    pub fn new(runtime: Arc<AudioRuntime>) -> Self {
        Self { runtime }
    }

    /// List device names in native order. Unnamed devices are skipped.
    pub fn list_devices(&self, direction: Direction) -> Result<Vec<String>, AudioError> {
        let lease = self.runtime.acquire()?;
        let subsystem = lease.runtime().subsystem();
        let count = subsystem.device_count(direction);

        let devices: Vec<String> = (0..count)
            .filter_map(|index| subsystem.device_name(direction, index))
            .filter(|name| !name.is_empty())
            .collect();

        log::debug!("Found {} {} devices", devices.len(), direction);
        Ok(devices)
    }

    /// Resolve the device at `index` in the list returned by
    /// [`list_devices`](Self::list_devices).
    pub fn resolve_by_index(&self, direction: Direction, index: usize) -> Result<DeviceIdentity, AudioError> {
        let name = self
            .list_devices(direction)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| AudioError::DeviceNotFound {
                direction,
                query: format!("index {}", index),
            })?;
        Ok(DeviceIdentity { name, direction })
    }

    /// Resolve the first device whose name starts with `prefix`, ignoring case.
    ///
    /// Device 0 is the fallback default: it is never matched against the
    /// prefix but is returned when nothing else matches.
    pub fn resolve_by_prefix(&self, direction: Direction, prefix: &str) -> Result<DeviceIdentity, AudioError> {
        let lease = self.runtime.acquire()?;
        let subsystem = lease.runtime().subsystem();
        let count = subsystem.device_count(direction);
        let wanted = prefix.to_lowercase();

        for index in 1..count {
            if let Some(name) = subsystem.device_name(direction, index) {
                if name.to_lowercase().starts_with(&wanted) {
                    return Ok(DeviceIdentity { name, direction });
                }
            }
        }

        match subsystem.device_name(direction, 0) {
            Some(name) if count > 0 => {
                log::debug!("No {} device starts with [{}], using default [{}]", direction, prefix, name);
                Ok(DeviceIdentity { name, direction })
            }
            _ => Err(AudioError::DeviceNotFound {
                direction,
                query: prefix.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockAudioSubsystem;

    fn directory(capture: &[&str], playback: &[&str]) -> (Arc<MockAudioSubsystem>, DeviceDirectory) {
        let mock = Arc::new(MockAudioSubsystem::with_devices(capture, playback));
        let runtime = AudioRuntime::new(Arc::clone(&mock));
        (mock, DeviceDirectory::new(runtime))
    }

    #[test]
    fn lists_named_devices_in_order() {
        let (_, dir) = directory(&["Mic", "", "Headset Mic"], &["Speakers"]);
        assert_eq!(dir.list_devices(Direction::Capture).unwrap(), vec!["Mic", "Headset Mic"]);
        assert_eq!(dir.list_devices(Direction::Playback).unwrap(), vec!["Speakers"]);
    }

    #[test]
    fn empty_list_is_not_an_error() {
        let (_, dir) = directory(&[], &[]);
        assert!(dir.list_devices(Direction::Capture).unwrap().is_empty());
    }

    #[test]
    fn index_resolution_is_bounds_checked() {
        let (_, dir) = directory(&["Mic", "USB Mic"], &[]);
        assert_eq!(dir.resolve_by_index(Direction::Capture, 1).unwrap().name, "USB Mic");

        let err = dir.resolve_by_index(Direction::Capture, 2).unwrap_err();
        assert!(matches!(err, AudioError::DeviceNotFound { .. }));
        assert!(dir.resolve_by_index(Direction::Playback, 0).is_err());
    }

    #[test]
    fn index_follows_the_listed_order_past_unnamed_devices() {
        let (_, dir) = directory(&["Mic", "", "Headset Mic"], &[]);
        let listed = dir.list_devices(Direction::Capture).unwrap();

        for (index, name) in listed.iter().enumerate() {
            assert_eq!(&dir.resolve_by_index(Direction::Capture, index).unwrap().name, name);
        }
        assert_eq!(dir.resolve_by_index(Direction::Capture, 1).unwrap().name, "Headset Mic");
        assert!(dir.resolve_by_index(Direction::Capture, 2).is_err());
    }

    #[test]
    fn prefix_match_is_case_insensitive_and_skips_default() {
        let (_, dir) = directory(&["Microphone (Default)", "Microphone (2- USB)", "Line In"], &[]);

        let found = dir.resolve_by_prefix(Direction::Capture, "microphone (2").unwrap();
        assert_eq!(found.name, "Microphone (2- USB)");
        assert_eq!(found.direction, Direction::Capture);

        // Device 0 also matches "micro", but it is only the fallback.
        assert_eq!(dir.resolve_by_prefix(Direction::Capture, "MICRO").unwrap().name, "Microphone (2- USB)");
    }

    #[test]
    fn prefix_miss_falls_back_to_device_zero() {
        let (_, dir) = directory(&[], &["Speakers", "Headphones"]);
        assert_eq!(dir.resolve_by_prefix(Direction::Playback, "HDMI").unwrap().name, "Speakers");
    }

    #[test]
    fn prefix_with_no_devices_is_not_found() {
        let (_, dir) = directory(&[], &[]);
        let err = dir.resolve_by_prefix(Direction::Playback, "Speakers").unwrap_err();
        assert_eq!(
            err,
            AudioError::DeviceNotFound {
                direction: Direction::Playback,
                query: "Speakers".into()
            }
        );
    }

    #[test]
    fn queries_do_not_keep_the_library_alive() {
        let (mock, dir) = directory(&["Mic"], &[]);
        dir.list_devices(Direction::Capture).unwrap();
        assert!(!mock.is_initialised());
        assert_eq!(mock.init_count(), 1);
        assert_eq!(mock.quit_count(), 1);
    }
}
