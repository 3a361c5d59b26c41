//! `AudioSubsystem` implementation on top of cpal.

use std::collections::HashMap;

use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Observer, Producer};

use media_audio_core::{AudioSpec, AudioSubsystem, DeviceHandle, DeviceStatus, Direction};

use crate::device_enumerator::DeviceEnumerator;
use crate::error::BackendError;
use crate::stream_worker::{DeviceQueue, StreamWorker};

struct OpenDevice {
    name: String,
    paused: bool,
    queue: DeviceQueue,
    worker: StreamWorker,
}

#[derive(Default)]
struct SubsystemState {
    initialised: bool,
    next_handle: u32,
    devices: HashMap<u32, OpenDevice>,
}

/// Queue-based audio subsystem backed by the platform's default cpal host.
///
/// Devices are opened paused. Recorded audio accumulates in a per-device
/// byte queue until dequeued; audio queued for playback is rendered by the
/// output stream, with silence whenever the queue runs dry.
#[derive(Default)]
pub struct CpalAudioSubsystem {
    state: Mutex<SubsystemState>,
}

impl CpalAudioSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_device<R>(&self, handle: DeviceHandle, f: impl FnOnce(&mut OpenDevice) -> R) -> Option<R> {
        self.state.lock().devices.get_mut(&handle.0).map(f)
    }
}

impl AudioSubsystem for CpalAudioSubsystem {
    fn init(&self) -> Result<(), String> {
        let enumerator = DeviceEnumerator::new();
        log::info!("Audio subsystem using the {} host", enumerator.host_name());
        self.state.lock().initialised = true;
        Ok(())
    }

    fn quit(&self) {
        let mut state = self.state.lock();
        let open = state.devices.len();
        state.devices.clear();
        state.initialised = false;
        if open > 0 {
            log::warn!("Audio subsystem shut down with {} open devices", open);
        }
    }

    fn device_count(&self, direction: Direction) -> usize {
        DeviceEnumerator::new().list(direction).len()
    }

    fn device_name(&self, direction: Direction, index: usize) -> Option<String> {
        DeviceEnumerator::new().list(direction).into_iter().nth(index)
    }

    fn open_device(&self, name: &str, direction: Direction, spec: &AudioSpec) -> Result<DeviceHandle, String> {
        if !self.state.lock().initialised {
            return Err(BackendError::NotInitialised.to_string());
        }

        let device = DeviceEnumerator::new()
            .find(direction, name)
            .map_err(|e| e.to_string())?;
        let (worker, queue) = StreamWorker::spawn(device, name, direction, spec).map_err(|e| e.to_string())?;

        let mut state = self.state.lock();
        state.next_handle += 1;
        let handle = DeviceHandle(state.next_handle);
        state.devices.insert(
            handle.0,
            OpenDevice {
                name: name.to_string(),
                paused: true,
                queue,
                worker,
            },
        );
        Ok(handle)
    }

    fn close_device(&self, handle: DeviceHandle) {
        // Dropped outside the lock: joining the worker can take a moment.
        let removed = self.state.lock().devices.remove(&handle.0);
        if let Some(device) = removed {
            log::debug!("Closing stream for [{}]", device.name);
        }
    }

    fn pause_device(&self, handle: DeviceHandle, paused: bool) {
        self.with_device(handle, |device| {
            if device.paused != paused {
                device.worker.pause(paused);
                device.paused = paused;
            }
        });
    }

    fn device_status(&self, handle: DeviceHandle) -> DeviceStatus {
        self.with_device(handle, |device| {
            if device.worker.is_stopped() {
                DeviceStatus::Stopped
            } else if device.paused {
                DeviceStatus::Paused
            } else {
                DeviceStatus::Playing
            }
        })
        .unwrap_or(DeviceStatus::Stopped)
    }

    fn queued_bytes(&self, handle: DeviceHandle) -> usize {
        self.with_device(handle, |device| match &device.queue {
            DeviceQueue::Capture(consumer) => consumer.occupied_len(),
            DeviceQueue::Playback(producer) => producer.occupied_len(),
        })
        .unwrap_or(0)
    }

    fn queue_audio(&self, handle: DeviceHandle, data: &[u8]) -> Result<(), String> {
        self.with_device(handle, |device| match &mut device.queue {
            DeviceQueue::Playback(producer) => {
                let written = producer.push_slice(data);
                if written < data.len() {
                    log::warn!(
                        "Playback queue for [{}] full, dropped {} bytes",
                        device.name,
                        data.len() - written
                    );
                }
                Ok(())
            }
            DeviceQueue::Capture(_) => Err("Cannot queue audio to a capture device".to_string()),
        })
        .unwrap_or_else(|| Err("Invalid audio device ID".to_string()))
    }

    fn dequeue_audio(&self, handle: DeviceHandle, buf: &mut [u8]) -> usize {
        self.with_device(handle, |device| match &mut device.queue {
            DeviceQueue::Capture(consumer) => consumer.pop_slice(buf),
            DeviceQueue::Playback(_) => 0,
        })
        .unwrap_or(0)
    }
}
