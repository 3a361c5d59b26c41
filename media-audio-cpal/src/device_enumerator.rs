//! Audio device enumeration through the cpal default host.
//!
//! The default device of each direction is listed first, so index 0 is
//! always the system default; the remaining devices follow in host order.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use media_audio_core::Direction;

use crate::error::BackendError;

/// Lists and looks up cpal devices for one host.
pub struct DeviceEnumerator {
    host: Host,
}

impl DeviceEnumerator {
    /// Enumerator over the platform's default host.
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    pub fn host_name(&self) -> &'static str {
        self.host.id().name()
    }

    /// Device names for `direction`, default device first. Devices whose
    /// name can not be read are skipped.
    pub fn list(&self, direction: Direction) -> Vec<String> {
        let default_name = self.default_device(direction).and_then(|d| d.name().ok());
        let mut names: Vec<String> = default_name.iter().cloned().collect();

        for device in self.devices(direction) {
            match device.name() {
                Ok(name) if Some(&name) != default_name.as_ref() => names.push(name),
                Ok(_) => {}
                Err(e) => log::debug!("Skipping {} device without a name: {}", direction, e),
            }
        }
        names
    }

    /// Find a device by exact name; an empty name selects the default.
    pub fn find(&self, direction: Direction, name: &str) -> Result<Device, BackendError> {
        let not_found = || BackendError::NoSuchDevice {
            direction,
            name: name.to_string(),
        };

        if name.is_empty() {
            return self.default_device(direction).ok_or_else(not_found);
        }
        self.devices(direction)
            .into_iter()
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(not_found)
    }

    fn default_device(&self, direction: Direction) -> Option<Device> {
        match direction {
            Direction::Capture => self.host.default_input_device(),
            Direction::Playback => self.host.default_output_device(),
        }
    }

    fn devices(&self, direction: Direction) -> Vec<Device> {
        let result = match direction {
            Direction::Capture => self.host.input_devices().map(|d| d.collect::<Vec<_>>()),
            Direction::Playback => self.host.output_devices().map(|d| d.collect::<Vec<_>>()),
        };
        result.unwrap_or_else(|e| {
            log::warn!("Failed to enumerate {} devices: {}", direction, e);
            Vec::new()
        })
    }
}

impl Default for DeviceEnumerator {
    fn default() -> Self {
        Self::new()
    }
}
