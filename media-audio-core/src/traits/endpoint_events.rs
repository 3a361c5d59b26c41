use std::sync::Arc;

use crate::models::audio_format::AudioSamplingRate;
use crate::models::error::AudioError;

/// Callback invoked for every captured chunk, before encoding.
///
/// Parameters:
/// - sampling-rate class of the capture device
/// - sample count
/// - the samples (mono, signed 16-bit)
pub type RawSampleCallback = Arc<dyn Fn(AudioSamplingRate, u32, &[i16]) + Send + Sync + 'static>;

/// Callback invoked with each non-empty encoded payload.
///
/// Parameters:
/// - duration in RTP clock units
/// - encoded payload
pub type EncodedSampleCallback = Arc<dyn Fn(u32, &[u8]) + Send + Sync + 'static>;

/// Callback invoked after an endpoint force-closed itself. The error's
/// `Display` text is the human-readable message.
pub type ErrorCallback = Arc<dyn Fn(&AudioError) + Send + Sync + 'static>;
