//! State shared by the source and sink controllers and their worker threads.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::device::runtime::AudioRuntime;
use crate::models::audio_format::AudioFormat;
use crate::models::audio_spec::AudioSpec;
use crate::models::config::EndpointConfig;
use crate::models::device::Direction;
use crate::models::error::AudioError;
use crate::models::state::EndpointState;
use crate::session::device_session::DeviceSession;
use crate::session::subscribers::Subscribers;
use crate::traits::endpoint_events::ErrorCallback;

/// Lock order is `state` before `session`.
pub(crate) struct EndpointCore {
    pub session: Arc<Mutex<DeviceSession>>,
    pub state: Mutex<EndpointState>,
    pub errors: Subscribers<ErrorCallback>,
}

impl EndpointCore {
    pub fn new(runtime: Arc<AudioRuntime>, direction: Direction) -> Arc<Self> {
        Arc::new(Self {
            session: Arc::new(Mutex::new(DeviceSession::new(runtime, direction))),
            state: Mutex::new(EndpointState::Closed),
            errors: Subscribers::new(),
        })
    }

    pub fn state(&self) -> EndpointState {
        *self.state.lock()
    }

    /// Open the configured device for `format`, replacing any open one.
    pub fn open_device(&self, config: &EndpointConfig, format: &AudioFormat, frame_size: u32) -> Result<(), AudioError> {
        let samples = u16::try_from(frame_size).unwrap_or(u16::MAX);
        let spec = AudioSpec::for_format(format, samples);
        self.session.lock().open(&config.device_name, spec)?;
        Ok(())
    }

    /// `Closed` → `Paused`, only when a device is open.
    pub fn begin_start(&self) -> bool {
        let mut state = self.state.lock();
        if state.is_started() || !self.session.lock().is_open() {
            return false;
        }
        *state = EndpointState::Paused;
        true
    }

    /// Move `from` → `to`; returns `false` (and changes nothing) if the
    /// current state is not `from`.
    pub fn transition(&self, from: EndpointState, to: EndpointState) -> bool {
        let mut state = self.state.lock();
        if *state != from {
            return false;
        }
        *state = to;
        true
    }

    pub fn pause_device(&self, paused: bool) {
        self.session.lock().pause(paused);
    }

    /// Mark the endpoint closed but keep the device (and the library) open,
    /// ready to be replaced by a reopen.
    pub fn mark_closed(&self) {
        *self.state.lock() = EndpointState::Closed;
    }

    /// Close the native device and mark the endpoint closed.
    pub fn release(&self) {
        self.session.lock().close();
        *self.state.lock() = EndpointState::Closed;
    }

    /// Forced close after a runtime or init failure, then notify subscribers.
    pub fn fail(&self, error: &AudioError) {
        log::error!("Closing audio endpoint: {}", error);
        self.release();
        self.notify(error);
    }

    pub fn notify(&self, error: &AudioError) {
        for callback in self.errors.snapshot() {
            callback(error);
        }
    }
}
