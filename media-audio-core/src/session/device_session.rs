//! One open native device handle and its lifecycle.

use std::sync::Arc;

use crate::device::runtime::{AudioRuntime, RuntimeLease};
use crate::models::audio_spec::AudioSpec;
use crate::models::device::{DeviceHandle, DeviceStatus, Direction};
use crate::models::error::AudioError;
use crate::models::state::SessionState;
use crate::processing::pcm;

/// Owns at most one native device handle for one direction.
///
/// The session holds a [`RuntimeLease`] while a device is open, so the native
/// library stays initialised across a close/reopen and is shut down once the
/// last session of the process closes.
#[derive(Debug)]
pub struct DeviceSession {
    runtime: Arc<AudioRuntime>,
    direction: Direction,
    name: String,
    handle: DeviceHandle,
    spec: Option<AudioSpec>,
    paused: bool,
    lease: Option<RuntimeLease>,
}

impl DeviceSession {
    pub fn new(runtime: Arc<AudioRuntime>, direction: Direction) -> Self {
        Self {
            runtime,
            direction,
            name: String::new(),
            handle: DeviceHandle::INVALID,
            spec: None,
            paused: true,
            lease: None,
        }
    }

    /// Open `name` (empty = system default) with `spec`, replacing any device
    /// already open. The device starts paused.
    ///
    /// On failure nothing is left open.
    pub fn open(&mut self, name: &str, spec: AudioSpec) -> Result<DeviceHandle, AudioError> {
        let lease = match self.lease.take() {
            Some(lease) => lease,
            None => self.runtime.acquire()?,
        };
        self.release_handle();

        let result = lease.runtime().subsystem().open_device(name, self.direction, &spec);
        let init_failed = |reason: String| AudioError::DeviceInitFailed {
            direction: self.direction,
            name: name.to_string(),
            clock_rate: spec.clock_rate,
            reason,
        };

        let handle = match result {
            Ok(handle) if handle.is_valid() => handle,
            Ok(_) => return Err(init_failed("subsystem returned an invalid device handle".into())),
            Err(reason) => return Err(init_failed(reason)),
        };

        log::info!(
            "Opened {} device [{}] {} at {} Hz",
            self.direction,
            name,
            handle,
            spec.clock_rate
        );
        self.name = name.to_string();
        self.handle = handle;
        self.spec = Some(spec);
        self.paused = true;
        self.lease = Some(lease);
        Ok(handle)
    }

    /// Pause or unpause the native device. No-op while closed.
    pub fn pause(&mut self, paused: bool) {
        if !self.is_open() {
            return;
        }
        self.runtime.subsystem().pause_device(self.handle, paused);
        self.paused = paused;
    }

    /// Pause and release the native device. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.release_handle();
        self.lease = None;
    }

    fn release_handle(&mut self) {
        if !self.is_open() {
            return;
        }
        let subsystem = self.runtime.subsystem();
        subsystem.pause_device(self.handle, true);
        subsystem.close_device(self.handle);
        log::info!("Closed {} device [{}] {}", self.direction, self.name, self.handle);

        self.handle = DeviceHandle::INVALID;
        self.spec = None;
        self.paused = true;
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_valid()
    }

    /// `true` when the native device reports itself stopped, which is how an
    /// unplugged device shows up. A closed session also counts as stopped.
    pub fn is_stopped(&self) -> bool {
        !self.is_open() || self.status() == DeviceStatus::Stopped
    }

    pub fn status(&self) -> DeviceStatus {
        if !self.is_open() {
            return DeviceStatus::Stopped;
        }
        self.runtime.subsystem().device_status(self.handle)
    }

    pub fn state(&self) -> SessionState {
        match (self.is_open(), self.paused) {
            (false, _) => SessionState::Closed,
            (true, true) => SessionState::Paused,
            (true, false) => SessionState::Running,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    pub fn spec(&self) -> Option<AudioSpec> {
        self.spec
    }

    /// Bytes waiting in the native queue; 0 while closed.
    pub fn queued_bytes(&self) -> usize {
        if !self.is_open() {
            return 0;
        }
        self.runtime.subsystem().queued_bytes(self.handle)
    }

    /// Copy `data` into the native playback queue.
    pub fn enqueue(&self, data: &[u8]) -> Result<(), AudioError> {
        self.runtime
            .subsystem()
            .queue_audio(self.handle, data)
            .map_err(|reason| AudioError::Backend {
                name: self.name.clone(),
                reason,
            })
    }

    /// Take one chunk of `chunk_bytes` from the capture queue, or `None` if
    /// less than a full chunk is waiting.
    ///
    /// `chunk_bytes == 0` takes everything queued, rounded down to whole
    /// samples. The returned buffer always has an even length.
    pub fn dequeue_chunk(&self, chunk_bytes: usize) -> Option<Vec<u8>> {
        if !self.is_open() {
            return None;
        }
        let subsystem = self.runtime.subsystem();
        let available = subsystem.queued_bytes(self.handle);
        let wanted = if chunk_bytes == 0 {
            pcm::whole_samples(available)
        } else {
            pcm::whole_samples(chunk_bytes)
        };
        if wanted == 0 || available < wanted {
            return None;
        }

        let mut buf = vec![0u8; wanted];
        let read = subsystem.dequeue_audio(self.handle, &mut buf);
        buf.truncate(pcm::whole_samples(read));
        if buf.is_empty() {
            return None;
        }
        Some(buf)
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::{MockAudioSubsystem, OpenFailure};

    fn session(direction: Direction) -> (Arc<MockAudioSubsystem>, Arc<AudioRuntime>, DeviceSession) {
        let mock = Arc::new(MockAudioSubsystem::with_devices(&["Mic"], &["Speakers"]));
        let runtime = AudioRuntime::new(Arc::clone(&mock));
        let session = DeviceSession::new(Arc::clone(&runtime), direction);
        (mock, runtime, session)
    }

    #[test]
    fn open_starts_paused_and_initialises_the_library() {
        let (mock, runtime, mut session) = session(Direction::Playback);
        assert_eq!(session.state(), SessionState::Closed);

        let handle = session.open("Speakers", AudioSpec::mono_s16(8000, 0)).unwrap();
        assert!(handle.is_valid());
        assert_eq!(session.state(), SessionState::Paused);
        assert_eq!(mock.is_paused(handle), Some(true));
        assert_eq!(runtime.active_leases(), 1);
        assert_eq!(session.spec().map(|s| s.clock_rate), Some(8000));
    }

    #[test]
    fn reopen_closes_the_previous_handle_without_quitting() {
        let (mock, _runtime, mut session) = session(Direction::Capture);
        let first = session.open("Mic", AudioSpec::mono_s16(8000, 0)).unwrap();
        let second = session.open("Mic", AudioSpec::mono_s16(16000, 0)).unwrap();

        assert_ne!(first, second);
        assert_eq!(mock.open_handles(Direction::Capture), vec![second]);
        assert_eq!(mock.close_count(), 1);
        assert_eq!(mock.init_count(), 1);
        assert_eq!(mock.quit_count(), 0);
    }

    #[test]
    fn failed_open_leaves_nothing_open() {
        let (mock, runtime, mut session) = session(Direction::Capture);
        session.open("Mic", AudioSpec::default()).unwrap();

        mock.fail_next_open(OpenFailure::InvalidHandle);
        let err = session.open("Mic", AudioSpec::mono_s16(16000, 0)).unwrap_err();
        assert!(matches!(
            err,
            AudioError::DeviceInitFailed { clock_rate: 16000, .. }
        ));
        assert!(!session.is_open());
        assert!(mock.open_handles(Direction::Capture).is_empty());
        assert_eq!(runtime.active_leases(), 0);
    }

    #[test]
    fn unknown_device_reports_native_reason() {
        let (_mock, _runtime, mut session) = session(Direction::Playback);
        let err = session.open("HDMI", AudioSpec::default()).unwrap_err();
        assert_eq!(
            err,
            AudioError::DeviceInitFailed {
                direction: Direction::Playback,
                name: "HDMI".into(),
                clock_rate: 8000,
                reason: "No such device".into(),
            }
        );
    }

    #[test]
    fn close_is_idempotent_and_releases_the_library() {
        let (mock, runtime, mut session) = session(Direction::Playback);
        session.open("Speakers", AudioSpec::default()).unwrap();

        session.close();
        session.close();
        assert_eq!(mock.close_count(), 1);
        assert_eq!(mock.quit_count(), 1);
        assert_eq!(runtime.active_leases(), 0);
        assert_eq!(session.handle(), DeviceHandle::INVALID);
    }

    #[test]
    fn pause_is_ignored_while_closed() {
        let (mock, _runtime, mut session) = session(Direction::Capture);
        session.pause(false);
        assert_eq!(session.state(), SessionState::Closed);

        let handle = session.open("Mic", AudioSpec::default()).unwrap();
        session.pause(false);
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(mock.is_paused(handle), Some(false));
    }

    #[test]
    fn dequeue_waits_for_a_full_chunk() {
        let (mock, _runtime, mut session) = session(Direction::Capture);
        let handle = session.open("Mic", AudioSpec::default()).unwrap();

        mock.push_capture(handle, &[0u8; 100]);
        assert!(session.dequeue_chunk(160).is_none());

        mock.push_capture(handle, &[0u8; 100]);
        let chunk = session.dequeue_chunk(160).unwrap();
        assert_eq!(chunk.len(), 160);
        assert_eq!(session.queued_bytes(), 40);
    }

    #[test]
    fn zero_chunk_takes_whole_samples() {
        let (mock, _runtime, mut session) = session(Direction::Capture);
        let handle = session.open("Mic", AudioSpec::default()).unwrap();

        mock.push_capture(handle, &[1u8; 7]);
        assert_eq!(session.dequeue_chunk(0).unwrap().len(), 6);
        assert_eq!(session.queued_bytes(), 1);
        assert!(session.dequeue_chunk(0).is_none());
    }

    #[test]
    fn unplugged_device_reports_stopped() {
        let (mock, _runtime, mut session) = session(Direction::Capture);
        assert!(session.is_stopped());

        let handle = session.open("Mic", AudioSpec::default()).unwrap();
        assert!(!session.is_stopped());
        mock.disconnect(handle);
        assert!(session.is_stopped());
    }

    #[test]
    fn drop_closes_the_device() {
        let (mock, runtime, mut session) = session(Direction::Playback);
        session.open("Speakers", AudioSpec::default()).unwrap();
        drop(session);
        assert!(mock.open_handles(Direction::Playback).is_empty());
        assert_eq!(runtime.active_leases(), 0);
    }
}
