//! In-memory native audio subsystem for testing without hardware.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::models::audio_spec::AudioSpec;
use crate::models::device::{DeviceHandle, DeviceStatus, Direction};
use crate::traits::audio_subsystem::AudioSubsystem;

/// How the next `open_device` call should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenFailure {
    /// Return an error with this native text.
    Error(String),
    /// Return `DeviceHandle::INVALID` without an error.
    InvalidHandle,
}

#[derive(Debug)]
struct MockDevice {
    direction: Direction,
    spec: AudioSpec,
    paused: bool,
    disconnected: bool,
    queue: VecDeque<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    capture_devices: Vec<String>,
    playback_devices: Vec<String>,
    devices: HashMap<u32, MockDevice>,
    next_handle: u32,
    initialised: bool,
    init_failure: Option<String>,
    open_failure: Option<OpenFailure>,
    init_calls: usize,
    quit_calls: usize,
    open_calls: usize,
    close_calls: usize,
    dequeue_calls: usize,
}

impl MockState {
    fn names(&self, direction: Direction) -> &Vec<String> {
        match direction {
            Direction::Capture => &self.capture_devices,
            Direction::Playback => &self.playback_devices,
        }
    }
}

/// A fake queue-based audio library.
///
/// Capture queues only fill when a test pushes bytes; playback queues never
/// drain, so their length can be probed after submitting audio.
///
/// # Example
///
/// ```
/// use media_audio_core::device::mock::MockAudioSubsystem;
/// use media_audio_core::{AudioSubsystem, Direction};
///
/// let mock = MockAudioSubsystem::with_devices(&["Built-in Mic"], &["Speakers"]);
/// assert_eq!(mock.device_count(Direction::Capture), 1);
/// assert_eq!(mock.device_name(Direction::Playback, 0).as_deref(), Some("Speakers"));
/// ```
#[derive(Debug, Default)]
pub struct MockAudioSubsystem {
    state: Mutex<MockState>,
}

impl MockAudioSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_devices(capture: &[&str], playback: &[&str]) -> Self {
        let mock = Self::new();
        mock.set_devices(Direction::Capture, capture);
        mock.set_devices(Direction::Playback, playback);
        mock
    }

    /// Replace the device list for `direction`, as a hot-plug event would.
    pub fn set_devices(&self, direction: Direction, names: &[&str]) {
        let names = names.iter().map(|n| n.to_string()).collect();
        let mut state = self.state.lock();
        match direction {
            Direction::Capture => state.capture_devices = names,
            Direction::Playback => state.playback_devices = names,
        }
    }

    pub fn fail_init(&self, reason: &str) {
        self.state.lock().init_failure = Some(reason.to_string());
    }

    /// Make the next `open_device` call fail.
    pub fn fail_next_open(&self, failure: OpenFailure) {
        self.state.lock().open_failure = Some(failure);
    }

    /// Append recorded bytes to an open capture device.
    pub fn push_capture(&self, handle: DeviceHandle, bytes: &[u8]) {
        let mut state = self.state.lock();
        if let Some(device) = state.devices.get_mut(&handle.0) {
            if device.direction.is_capture() {
                device.queue.extend(bytes.iter().copied());
            }
        }
    }

    /// Append recorded bytes to every open capture device.
    pub fn push_capture_all(&self, bytes: &[u8]) {
        let mut state = self.state.lock();
        for device in state.devices.values_mut() {
            if device.direction.is_capture() {
                device.queue.extend(bytes.iter().copied());
            }
        }
    }

    /// Simulate the device being unplugged.
    pub fn disconnect(&self, handle: DeviceHandle) {
        if let Some(device) = self.state.lock().devices.get_mut(&handle.0) {
            device.disconnected = true;
        }
    }

    pub fn disconnect_all(&self, direction: Direction) {
        let mut state = self.state.lock();
        for device in state.devices.values_mut() {
            if device.direction == direction {
                device.disconnected = true;
            }
        }
    }

    /// Handles currently open for `direction`, in ascending order.
    pub fn open_handles(&self, direction: Direction) -> Vec<DeviceHandle> {
        let state = self.state.lock();
        let mut handles: Vec<DeviceHandle> = state
            .devices
            .iter()
            .filter(|(_, d)| d.direction == direction)
            .map(|(id, _)| DeviceHandle(*id))
            .collect();
        handles.sort_by_key(|h| h.0);
        handles
    }

    pub fn queue_len(&self, handle: DeviceHandle) -> usize {
        self.state
            .lock()
            .devices
            .get(&handle.0)
            .map(|d| d.queue.len())
            .unwrap_or(0)
    }

    pub fn is_paused(&self, handle: DeviceHandle) -> Option<bool> {
        self.state.lock().devices.get(&handle.0).map(|d| d.paused)
    }

    pub fn spec_of(&self, handle: DeviceHandle) -> Option<AudioSpec> {
        self.state.lock().devices.get(&handle.0).map(|d| d.spec)
    }

    pub fn is_initialised(&self) -> bool {
        self.state.lock().initialised
    }

    pub fn init_count(&self) -> usize {
        self.state.lock().init_calls
    }

    pub fn quit_count(&self) -> usize {
        self.state.lock().quit_calls
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().open_calls
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().close_calls
    }

    pub fn dequeue_count(&self) -> usize {
        self.state.lock().dequeue_calls
    }
}

impl AudioSubsystem for MockAudioSubsystem {
    fn init(&self) -> Result<(), String> {
        let mut state = self.state.lock();
        state.init_calls += 1;
        if let Some(reason) = state.init_failure.take() {
            return Err(reason);
        }
        state.initialised = true;
        Ok(())
    }

    fn quit(&self) {
        let mut state = self.state.lock();
        state.quit_calls += 1;
        state.initialised = false;
        state.devices.clear();
    }

    fn device_count(&self, direction: Direction) -> usize {
        self.state.lock().names(direction).len()
    }

    fn device_name(&self, direction: Direction, index: usize) -> Option<String> {
        self.state.lock().names(direction).get(index).cloned()
    }

    fn open_device(&self, name: &str, direction: Direction, spec: &AudioSpec) -> Result<DeviceHandle, String> {
        let mut state = self.state.lock();
        if !state.initialised {
            return Err("Audio subsystem is not initialized".into());
        }
        match state.open_failure.take() {
            Some(OpenFailure::Error(reason)) => return Err(reason),
            Some(OpenFailure::InvalidHandle) => return Ok(DeviceHandle::INVALID),
            None => {}
        }

        let names = state.names(direction);
        let known = if name.is_empty() {
            !names.is_empty()
        } else {
            names.iter().any(|n| n == name)
        };
        if !known {
            return Err("No such device".into());
        }

        state.next_handle += 1;
        let handle = DeviceHandle(state.next_handle);
        state.open_calls += 1;
        state.devices.insert(
            handle.0,
            MockDevice {
                direction,
                spec: *spec,
                paused: true,
                disconnected: false,
                queue: VecDeque::new(),
            },
        );
        Ok(handle)
    }

    fn close_device(&self, handle: DeviceHandle) {
        let mut state = self.state.lock();
        if state.devices.remove(&handle.0).is_some() {
            state.close_calls += 1;
        }
    }

    fn pause_device(&self, handle: DeviceHandle, paused: bool) {
        if let Some(device) = self.state.lock().devices.get_mut(&handle.0) {
            device.paused = paused;
        }
    }

    fn device_status(&self, handle: DeviceHandle) -> DeviceStatus {
        match self.state.lock().devices.get(&handle.0) {
            None => DeviceStatus::Stopped,
            Some(d) if d.disconnected => DeviceStatus::Stopped,
            Some(d) if d.paused => DeviceStatus::Paused,
            Some(_) => DeviceStatus::Playing,
        }
    }

    fn queued_bytes(&self, handle: DeviceHandle) -> usize {
        self.queue_len(handle)
    }

    fn queue_audio(&self, handle: DeviceHandle, data: &[u8]) -> Result<(), String> {
        let mut state = self.state.lock();
        let device = state
            .devices
            .get_mut(&handle.0)
            .ok_or_else(|| "Invalid audio device ID".to_string())?;
        if device.direction.is_capture() {
            return Err("Cannot queue audio to a capture device".into());
        }
        device.queue.extend(data.iter().copied());
        Ok(())
    }

    fn dequeue_audio(&self, handle: DeviceHandle, buf: &mut [u8]) -> usize {
        let mut state = self.state.lock();
        state.dequeue_calls += 1;
        let Some(device) = state.devices.get_mut(&handle.0) else {
            return 0;
        };
        let count = buf.len().min(device.queue.len());
        for (slot, byte) in buf.iter_mut().zip(device.queue.drain(..count)) {
            *slot = byte;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialised() -> MockAudioSubsystem {
        let mock = MockAudioSubsystem::with_devices(&["Mic A", "Mic B"], &["Speakers"]);
        mock.init().unwrap();
        mock
    }

    #[test]
    fn open_requires_init_and_known_name() {
        let mock = MockAudioSubsystem::with_devices(&["Mic A"], &[]);
        let spec = AudioSpec::default();
        assert!(mock.open_device("Mic A", Direction::Capture, &spec).is_err());

        mock.init().unwrap();
        assert!(mock.open_device("Nope", Direction::Capture, &spec).is_err());
        assert!(mock.open_device("", Direction::Playback, &spec).is_err());
        let handle = mock.open_device("Mic A", Direction::Capture, &spec).unwrap();
        assert!(handle.is_valid());
        assert_eq!(mock.is_paused(handle), Some(true));
        assert_eq!(mock.device_status(handle), DeviceStatus::Paused);
    }

    #[test]
    fn capture_queue_dequeues_in_order() {
        let mock = initialised();
        let handle = mock.open_device("Mic B", Direction::Capture, &AudioSpec::default()).unwrap();
        mock.push_capture(handle, &[1, 2, 3, 4, 5]);

        let mut buf = [0u8; 4];
        assert_eq!(mock.dequeue_audio(handle, &mut buf), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(mock.queued_bytes(handle), 1);
        assert_eq!(mock.dequeue_count(), 1);
    }

    #[test]
    fn playback_queue_rejects_capture_handles() {
        let mock = initialised();
        let mic = mock.open_device("Mic A", Direction::Capture, &AudioSpec::default()).unwrap();
        let out = mock.open_device("Speakers", Direction::Playback, &AudioSpec::default()).unwrap();

        assert!(mock.queue_audio(mic, &[0, 0]).is_err());
        mock.queue_audio(out, &[0; 10]).unwrap();
        assert_eq!(mock.queue_len(out), 10);
        assert!(mock.queue_audio(DeviceHandle(99), &[0]).is_err());
    }

    #[test]
    fn disconnect_reports_stopped() {
        let mock = initialised();
        let handle = mock.open_device("Mic A", Direction::Capture, &AudioSpec::default()).unwrap();
        mock.pause_device(handle, false);
        assert_eq!(mock.device_status(handle), DeviceStatus::Playing);

        mock.disconnect(handle);
        assert_eq!(mock.device_status(handle), DeviceStatus::Stopped);
        assert_eq!(mock.device_status(DeviceHandle(42)), DeviceStatus::Stopped);
    }

    #[test]
    fn forced_open_failures_are_one_shot() {
        let mock = initialised();
        let spec = AudioSpec::default();
        mock.fail_next_open(OpenFailure::InvalidHandle);
        assert_eq!(mock.open_device("Mic A", Direction::Capture, &spec), Ok(DeviceHandle::INVALID));

        mock.fail_next_open(OpenFailure::Error("busy".into()));
        assert_eq!(mock.open_device("Mic A", Direction::Capture, &spec), Err("busy".to_string()));

        assert!(mock.open_device("Mic A", Direction::Capture, &spec).is_ok());
        assert_eq!(mock.open_count(), 1);
    }

    #[test]
    fn quit_drops_open_devices() {
        let mock = initialised();
        mock.open_device("Speakers", Direction::Playback, &AudioSpec::default()).unwrap();
        mock.quit();
        assert!(mock.open_handles(Direction::Playback).is_empty());
        assert!(!mock.is_initialised());
    }
}
