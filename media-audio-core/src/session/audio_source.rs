use std::sync::Arc;

use crate::device::runtime::AudioRuntime;
use crate::models::audio_format::AudioFormat;
use crate::models::config::EndpointConfig;
use crate::models::device::{DeviceHandle, Direction};
use crate::models::error::AudioError;
use crate::models::state::EndpointState;
use crate::session::capture_loop::{CaptureContext, CaptureLoop};
use crate::session::endpoint::EndpointCore;
use crate::session::format_manager::FormatManager;
use crate::session::subscribers::{SubscriptionId, Subscribers};
use crate::traits::audio_encoder::AudioEncoder;
use crate::traits::endpoint_events::{EncodedSampleCallback, ErrorCallback, RawSampleCallback};

/// Capture endpoint: a recording device, its capture loop and format
/// negotiation.
///
/// Nothing is opened until [`set_format`](Self::set_format); it reopens the
/// device at the new clock rate and starts capturing.
///
/// ```text
/// closed ──set_format()──→ running ⇄ paused
///   ↑                          │
///   └──── close() / fault ─────┘
/// ```
pub struct AudioSource {
    config: EndpointConfig,
    encoder: Arc<dyn AudioEncoder>,
    formats: FormatManager,
    frame_size: u32,
    /// Format the open device was opened with.
    active_format: Option<AudioFormat>,
    core: Arc<EndpointCore>,
    raw: Arc<Subscribers<RawSampleCallback>>,
    encoded: Arc<Subscribers<EncodedSampleCallback>>,
    capture: CaptureLoop,
}

impl AudioSource {
    pub fn new(
        runtime: Arc<AudioRuntime>,
        encoder: Arc<dyn AudioEncoder>,
        config: EndpointConfig,
    ) -> Result<Self, AudioError> {
        config.validate().map_err(AudioError::InvalidConfiguration)?;
        let supported = encoder.supported_formats();
        if supported.is_empty() {
            return Err(AudioError::EncoderUnavailable(
                "encoder offers no audio formats".into(),
            ));
        }
        let frame_size = config.frame_size.unwrap_or_else(|| encoder.frame_size());

        Ok(Self {
            config,
            encoder,
            formats: FormatManager::new(supported),
            frame_size,
            active_format: None,
            core: EndpointCore::new(runtime, Direction::Capture),
            raw: Arc::new(Subscribers::new()),
            encoded: Arc::new(Subscribers::new()),
            capture: CaptureLoop::new(),
        })
    }

    // --- Events ---

    pub fn on_raw_sample(&self, callback: RawSampleCallback) -> SubscriptionId {
        self.raw.add(callback)
    }

    pub fn on_encoded_sample(&self, callback: EncodedSampleCallback) -> SubscriptionId {
        self.encoded.add(callback)
    }

    pub fn on_error(&self, callback: ErrorCallback) -> SubscriptionId {
        self.core.errors.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.raw.remove(id) || self.encoded.remove(id) || self.core.errors.remove(id)
    }

    pub fn has_encoded_subscribers(&self) -> bool {
        self.encoded.has_any()
    }

    // --- Formats ---

    pub fn formats(&self) -> Vec<AudioFormat> {
        self.formats.formats()
    }

    /// Replace the format restriction used by the next
    /// [`set_format`](Self::set_format).
    ///
    /// An open device is not touched. If the new filter rejects the current
    /// selection, [`selected_format`](Self::selected_format) becomes `None`
    /// while the device keeps capturing in the format it was opened with.
    pub fn restrict_formats<F>(&mut self, filter: F)
    where
        F: Fn(&AudioFormat) -> bool + Send + Sync + 'static,
    {
        self.formats.restrict(Box::new(filter));
    }

    pub fn selected_format(&self) -> Option<&AudioFormat> {
        self.formats.selected()
    }

    /// Select `format`, reopen the recording device at its clock rate and
    /// start capturing.
    ///
    /// Only an unsupported format is returned as an error. A device that
    /// fails to open is reported to the error subscribers and leaves the
    /// source closed.
    pub fn set_format(&mut self, format: &AudioFormat) -> Result<(), AudioError> {
        self.formats.select(format)?;
        log::debug!(
            "Audio source format {} {} Hz",
            format.format_name,
            format.clock_rate
        );

        self.halt();
        if let Err(err) = self.core.open_device(&self.config, format, self.frame_size) {
            self.core.fail(&err);
            return Ok(());
        }
        self.active_format = Some(format.clone());
        self.start();
        Ok(())
    }

    // --- Lifecycle ---

    /// No-op if already started or no device is open.
    pub fn start(&mut self) {
        if self.core.begin_start() {
            log::debug!("Audio source started");
            self.resume();
        }
    }

    pub fn resume(&mut self) {
        let Some(format) = self.active_format.clone() else {
            return;
        };
        if !self.core.transition(EndpointState::Paused, EndpointState::Running) {
            return;
        }
        self.core.pause_device(false);

        let core = Arc::clone(&self.core);
        let ctx = CaptureContext {
            session: Arc::clone(&self.core.session),
            encoder: Arc::clone(&self.encoder),
            format,
            frame_size: self.frame_size,
            poll_interval: self.config.poll_interval(),
            raw_subscribers: Arc::clone(&self.raw),
            encoded_subscribers: Arc::clone(&self.encoded),
            on_fault: Arc::new(move |err: AudioError| core.fail(&err)),
        };
        if let Err(err) = self.capture.start(ctx) {
            self.close();
            self.core.notify(&err);
        }
    }

    /// Stop the capture loop (waiting for it) and pause the device.
    pub fn pause(&mut self) {
        if !self.core.transition(EndpointState::Running, EndpointState::Paused) {
            return;
        }
        self.capture.stop();
        self.core.pause_device(true);
        log::debug!("Audio source paused");
    }

    /// Stop capturing and release the device. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.halt();
        self.core.release();
    }

    fn halt(&mut self) {
        self.pause();
        self.capture.stop();
        self.core.mark_closed();
    }

    pub fn state(&self) -> EndpointState {
        self.core.state()
    }

    pub fn is_started(&self) -> bool {
        self.state().is_started()
    }

    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn device_handle(&self) -> DeviceHandle {
        self.core.session.lock().handle()
    }

    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }
}

impl Drop for AudioSource {
    fn drop(&mut self) {
        self.close();
    }
}
