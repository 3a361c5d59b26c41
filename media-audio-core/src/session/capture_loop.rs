//! Background polling of an open capture device.
//!
//! ```text
//! [native capture queue] → dequeue_chunk → bytes_to_samples ─┬→ raw subscribers
//!                                                            └→ encode → encoded subscribers
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::audio_format::{AudioFormat, AudioSamplingRate};
use crate::models::error::AudioError;
use crate::processing::pcm;
use crate::session::device_session::DeviceSession;
use crate::session::subscribers::Subscribers;
use crate::traits::audio_encoder::AudioEncoder;
use crate::traits::endpoint_events::{EncodedSampleCallback, RawSampleCallback};

/// Called on the capture thread once the device reports itself stopped.
/// The loop exits right after.
pub type FaultHandler = Arc<dyn Fn(AudioError) + Send + Sync>;

/// Everything one run of the capture thread needs.
pub struct CaptureContext {
    pub session: Arc<Mutex<DeviceSession>>,
    pub encoder: Arc<dyn AudioEncoder>,
    pub format: AudioFormat,
    /// Chunk length in samples; 0 drains the whole queue on each poll.
    pub frame_size: u32,
    pub poll_interval: Duration,
    pub raw_subscribers: Arc<Subscribers<RawSampleCallback>>,
    pub encoded_subscribers: Arc<Subscribers<EncodedSampleCallback>>,
    pub on_fault: FaultHandler,
}

/// Owns the capture thread. At most one runs per loop.
pub struct CaptureLoop {
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CaptureLoop {
    pub fn new() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(true)),
            handle: None,
        }
    }

    /// Spawn the capture thread unless one is already running.
    pub fn start(&mut self, ctx: CaptureContext) -> Result<(), AudioError> {
        if self.is_running() {
            return Ok(());
        }
        self.stop();

        // Each run gets its own flag so a detached, exiting thread can never
        // be revived by a later start.
        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Arc::clone(&cancel);

        let handle = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || run(ctx, &cancel))
            .map_err(|e| AudioError::Backend {
                name: "audio-capture".into(),
                reason: format!("failed to spawn capture thread: {}", e),
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the thread to finish after the current chunk.
    pub fn request_stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Cancel and wait for the thread. Called from the capture thread itself
    /// (e.g. from a subscriber), the thread is detached instead of joined.
    pub fn stop(&mut self) {
        self.request_stop();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            log::error!("Audio capture thread panicked");
        }
    }

    /// `true` while a thread is alive and has not been asked to stop.
    pub fn is_running(&self) -> bool {
        !self.cancel.load(Ordering::SeqCst) && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for CaptureLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(ctx: CaptureContext, cancel: &AtomicBool) {
    let chunk_bytes = ctx.frame_size as usize * pcm::BYTES_PER_SAMPLE;
    let sampling_rate = ctx.format.sampling_rate();
    log::debug!(
        "Capture loop started: {} at {} Hz, {} byte chunks",
        ctx.format.format_name,
        ctx.format.clock_rate,
        chunk_bytes
    );

    while !cancel.load(Ordering::SeqCst) {
        loop {
            let chunk = {
                let session = ctx.session.lock();
                if session.is_stopped() {
                    let error = AudioError::DeviceDisconnected {
                        direction: session.direction(),
                        name: session.name().to_string(),
                    };
                    drop(session);
                    log::warn!("Capture device stopped, leaving capture loop");
                    (ctx.on_fault)(error);
                    return;
                }
                session.dequeue_chunk(chunk_bytes)
            };

            let Some(bytes) = chunk else {
                break;
            };
            deliver(&ctx, sampling_rate, &bytes);

            if cancel.load(Ordering::SeqCst) {
                break;
            }
        }
        thread::sleep(ctx.poll_interval);
    }
    log::debug!("Capture loop stopped");
}

fn deliver(ctx: &CaptureContext, sampling_rate: AudioSamplingRate, bytes: &[u8]) {
    let samples = pcm::bytes_to_samples(bytes);
    let sample_count = samples.len() as u32;

    for callback in ctx.raw_subscribers.snapshot() {
        callback(sampling_rate, sample_count, &samples);
    }

    if !ctx.encoded_subscribers.has_any() {
        return;
    }
    let encoded = ctx.encoder.encode_audio(&samples, &ctx.format);
    if encoded.is_empty() {
        return;
    }
    let duration = ctx.format.rtp_duration(samples.len());
    for callback in ctx.encoded_subscribers.snapshot() {
        callback(duration, &encoded);
    }
}
