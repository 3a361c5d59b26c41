//! # media-audio-cpal
//!
//! cpal backend for media-audio-core.
//!
//! Provides:
//! - `CpalAudioSubsystem`: the `AudioSubsystem` trait over cpal streams,
//!   with per-device byte queues
//! - `DeviceEnumerator`: device listing and lookup on the default host
//! - `shared_runtime()`: the process-wide `AudioRuntime` every endpoint
//!   should share
//!
//! ## Platform Requirements
//! - Built only with the `cpal` feature
//! - Linux needs the ALSA development headers (`libasound2-dev`)
//! - Devices must support the negotiated clock rate natively (8 or 16 kHz
//!   for the narrowband/wideband codecs); nothing is resampled
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use media_audio_core::{AudioFormat, AudioSource, EndpointConfig};
//!
//! let runtime = media_audio_cpal::shared_runtime();
//! let mut source = AudioSource::new(runtime, encoder, EndpointConfig::default())?;
//! source.set_format(&AudioFormat::pcmu())?;
//! ```

pub mod convert;
#[cfg(feature = "cpal")]
pub mod cpal_subsystem;
#[cfg(feature = "cpal")]
pub mod device_enumerator;
#[cfg(feature = "cpal")]
pub mod error;
#[cfg(feature = "cpal")]
mod stream_worker;

#[cfg(feature = "cpal")]
pub use cpal_subsystem::CpalAudioSubsystem;
#[cfg(feature = "cpal")]
pub use device_enumerator::DeviceEnumerator;
#[cfg(feature = "cpal")]
pub use error::BackendError;

#[cfg(feature = "cpal")]
pub use runtime::shared_runtime;

#[cfg(feature = "cpal")]
mod runtime {
    use std::sync::Arc;

    use media_audio_core::AudioRuntime;
    use once_cell::sync::Lazy;

    use crate::cpal_subsystem::CpalAudioSubsystem;

    static RUNTIME: Lazy<Arc<AudioRuntime>> = Lazy::new(|| AudioRuntime::new(CpalAudioSubsystem::new()));

    /// The process-wide runtime wrapping one `CpalAudioSubsystem`.
    ///
    /// Created on first use; the native library itself is only initialised
    /// while some endpoint or directory query holds a lease.
    pub fn shared_runtime() -> Arc<AudioRuntime> {
        Arc::clone(&RUNTIME)
    }

    #[cfg(test)]
    mod tests {
        use serial_test::serial;

        use super::*;

        #[test]
        #[serial]
        fn shared_runtime_is_one_lazy_instance() {
            let first = shared_runtime();
            let second = shared_runtime();
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(first.active_leases(), 0);
        }
    }
}
