use std::sync::Arc;

use crate::models::audio_spec::AudioSpec;
use crate::models::device::{DeviceHandle, DeviceStatus, Direction};

/// Primitives of a native queue-based audio library.
///
/// Implemented by:
/// - `CpalAudioSubsystem` (media-audio-cpal)
/// - `MockAudioSubsystem` (in-memory, for tests)
///
/// The core never reimplements anything behind this trait; it only sequences
/// calls to it. Failures are reported as the native error text.
///
/// Buffer ownership at this boundary is explicit: `queue_audio` copies from
/// the borrowed slice before returning, and `dequeue_audio` copies into the
/// caller-owned slice. No buffer outlives the call that references it.
pub trait AudioSubsystem: Send + Sync {
    /// Process-wide initialisation. Called once by `AudioRuntime`.
    fn init(&self) -> Result<(), String>;

    /// Process-wide teardown. Called once the last runtime lease is dropped.
    fn quit(&self);

    /// Number of devices currently known for `direction`.
    fn device_count(&self, direction: Direction) -> usize;

    /// Name of device `index`, or `None` if the list changed underneath.
    fn device_name(&self, direction: Direction, index: usize) -> Option<String>;

    /// Open a device by name, initially paused. An empty name selects the
    /// default device. May return `DeviceHandle::INVALID` instead of an error.
    fn open_device(&self, name: &str, direction: Direction, spec: &AudioSpec) -> Result<DeviceHandle, String>;

    fn close_device(&self, handle: DeviceHandle);

    fn pause_device(&self, handle: DeviceHandle, paused: bool);

    fn device_status(&self, handle: DeviceHandle) -> DeviceStatus;

    /// Bytes currently waiting in the device queue.
    fn queued_bytes(&self, handle: DeviceHandle) -> usize;

    /// Append PCM bytes to a playback device queue.
    fn queue_audio(&self, handle: DeviceHandle, data: &[u8]) -> Result<(), String>;

    /// Move up to `buf.len()` recorded bytes into `buf`; returns the count.
    fn dequeue_audio(&self, handle: DeviceHandle, buf: &mut [u8]) -> usize;
}

impl<T: AudioSubsystem + ?Sized> AudioSubsystem for Arc<T> {
    fn init(&self) -> Result<(), String> {
        (**self).init()
    }

    fn quit(&self) {
        (**self).quit()
    }

    fn device_count(&self, direction: Direction) -> usize {
        (**self).device_count(direction)
    }

    fn device_name(&self, direction: Direction, index: usize) -> Option<String> {
        (**self).device_name(direction, index)
    }

    fn open_device(&self, name: &str, direction: Direction, spec: &AudioSpec) -> Result<DeviceHandle, String> {
        (**self).open_device(name, direction, spec)
    }

    fn close_device(&self, handle: DeviceHandle) {
        (**self).close_device(handle)
    }

    fn pause_device(&self, handle: DeviceHandle, paused: bool) {
        (**self).pause_device(handle, paused)
    }

    fn device_status(&self, handle: DeviceHandle) -> DeviceStatus {
        (**self).device_status(handle)
    }

    fn queued_bytes(&self, handle: DeviceHandle) -> usize {
        (**self).queued_bytes(handle)
    }

    fn queue_audio(&self, handle: DeviceHandle, data: &[u8]) -> Result<(), String> {
        (**self).queue_audio(handle, data)
    }

    fn dequeue_audio(&self, handle: DeviceHandle, buf: &mut [u8]) -> usize {
        (**self).dequeue_audio(handle, buf)
    }
}
