use std::sync::Arc;

use crate::device::runtime::AudioRuntime;
use crate::models::audio_format::AudioFormat;
use crate::models::config::EndpointConfig;
use crate::models::device::{DeviceHandle, Direction};
use crate::models::error::AudioError;
use crate::models::state::EndpointState;
use crate::processing::pcm;
use crate::session::endpoint::EndpointCore;
use crate::session::format_manager::FormatManager;
use crate::session::playback_feeder::PlaybackFeeder;
use crate::session::subscribers::SubscriptionId;
use crate::traits::audio_encoder::AudioEncoder;
use crate::traits::endpoint_events::ErrorCallback;

/// Playback endpoint: a playback device fed by external pushes.
///
/// There is no background thread; audio handed to `got_audio_*` is copied
/// into the native queue on the caller's thread. A device that stops while
/// audio is being submitted closes the sink and notifies the error
/// subscribers.
pub struct AudioSink {
    config: EndpointConfig,
    encoder: Arc<dyn AudioEncoder>,
    formats: FormatManager,
    frame_size: u32,
    active_format: Option<AudioFormat>,
    core: Arc<EndpointCore>,
    feeder: PlaybackFeeder,
}

impl AudioSink {
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
        let core = EndpointCore::new(runtime, Direction::Playback);
        let feeder = PlaybackFeeder::new(Arc::clone(&core.session));

        Ok(Self {
            config,
            encoder,
            formats: FormatManager::new(supported),
            frame_size,
            active_format: None,
            core,
            feeder,
        })
    }

    pub fn on_error(&self, callback: ErrorCallback) -> SubscriptionId {
        self.core.errors.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.core.errors.remove(id)
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
    /// while the device keeps playing in the format it was opened with.
    pub fn restrict_formats<F>(&mut self, filter: F)
    where
        F: Fn(&AudioFormat) -> bool + Send + Sync + 'static,
    {
        self.formats.restrict(Box::new(filter));
    }

    pub fn selected_format(&self) -> Option<&AudioFormat> {
        self.formats.selected()
    }

    /// Select `format` and reopen the playback device at its clock rate.
    ///
    /// Only an unsupported format is returned as an error; open failures go
    /// to the error subscribers.
    pub fn set_format(&mut self, format: &AudioFormat) -> Result<(), AudioError> {
        self.formats.select(format)?;
        log::debug!("Audio sink format {} {} Hz", format.format_name, format.clock_rate);

        self.pause();
        self.core.mark_closed();
        if let Err(err) = self.core.open_device(&self.config, format, self.frame_size) {
            self.core.fail(&err);
            return Ok(());
        }
        self.active_format = Some(format.clone());
        self.start();
        Ok(())
    }

    // --- Audio input ---

    /// Queue raw 16-bit little-endian PCM at the selected clock rate.
    pub fn got_audio_sample(&self, pcm: &[u8]) {
        if let Err(err) = self.feeder.submit(pcm) {
            self.core.fail(&err);
        }
    }

    pub fn got_audio_samples(&self, samples: &[i16]) {
        self.got_audio_sample(&pcm::samples_to_bytes(samples));
    }

    /// Decode an RTP payload with the selected format and queue the result.
    pub fn got_encoded_sample(&self, payload: &[u8]) {
        let Some(format) = self.active_format.as_ref() else {
            log::warn!("Dropping {} byte payload, no audio sink format", payload.len());
            return;
        };
        let samples = self.encoder.decode_audio(payload, format);
        if samples.is_empty() {
            return;
        }
        self.got_audio_samples(&samples);
    }

    /// Alias of [`got_encoded_sample`](Self::got_encoded_sample) for RTP
    /// receive handlers.
    pub fn got_audio_rtp(&self, payload: &[u8]) {
        self.got_encoded_sample(payload);
    }

    /// Bytes still waiting in the playback queue.
    pub fn queued_bytes(&self) -> usize {
        self.core.session.lock().queued_bytes()
    }

    // --- Lifecycle ---

    /// No-op if already started or no device is open.
    pub fn start(&mut self) {
        if self.core.begin_start() {
            log::debug!("Audio sink started");
            self.resume();
        }
    }

    pub fn resume(&mut self) {
        if self.core.transition(EndpointState::Paused, EndpointState::Running) {
            self.core.pause_device(false);
        }
    }

    pub fn pause(&mut self) {
        if self.core.transition(EndpointState::Running, EndpointState::Paused) {
            self.core.pause_device(true);
            log::debug!("Audio sink paused");
        }
    }

    /// Release the playback device. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.pause();
        self.core.release();
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
}

impl Drop for AudioSink {
    fn drop(&mut self) {
        self.close();
    }
}
