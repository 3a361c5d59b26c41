//! # media-audio-core
//!
//! Platform-agnostic bidirectional PCM audio endpoints for a real-time media
//! pipeline.
//!
//! Sits between a native queue-based audio library (behind the
//! `AudioSubsystem` trait) and an external codec (behind `AudioEncoder`).
//! An `AudioSource` polls a recording device and publishes raw and encoded
//! samples; an `AudioSink` takes raw or encoded samples and queues them on a
//! playback device. Both renegotiate the device whenever the codec format
//! changes.
//!
//! ## Architecture
//!
//! ```text
//! media-audio-core (this crate)
//! ├── traits/       ← AudioSubsystem, AudioEncoder, event callback types
//! ├── models/       ← AudioError, AudioFormat, AudioSpec, EndpointConfig, states
//! ├── processing/   ← 16-bit PCM byte/sample conversions
//! ├── device/       ← AudioRuntime (init/quit refcount), DeviceDirectory, mock subsystem
//! └── session/      ← DeviceSession, CaptureLoop, PlaybackFeeder, AudioSource, AudioSink
//! ```
//!
//! ## Data flow
//!
//! ```text
//! [recording device] → CaptureLoop → raw subscribers
//!                                  └→ AudioEncoder → encoded subscribers
//!
//! PCM / RTP payload → AudioSink (decode) → PlaybackFeeder → [playback device]
//! ```

pub mod device;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use device::directory::DeviceDirectory;
pub use device::mock::MockAudioSubsystem;
pub use device::runtime::{AudioRuntime, RuntimeLease};
pub use models::audio_format::{AudioFormat, AudioSamplingRate, DEFAULT_CLOCK_RATE};
pub use models::audio_spec::{AudioSpec, SampleFormat};
pub use models::config::EndpointConfig;
pub use models::device::{DeviceHandle, DeviceIdentity, DeviceStatus, Direction};
pub use models::error::AudioError;
pub use models::state::{EndpointState, SessionState};
pub use session::audio_sink::AudioSink;
pub use session::audio_source::AudioSource;
pub use session::device_session::DeviceSession;
pub use session::subscribers::SubscriptionId;
pub use traits::audio_encoder::{AudioEncoder, DEFAULT_FRAME_SIZE};
pub use traits::audio_subsystem::AudioSubsystem;
pub use traits::endpoint_events::{EncodedSampleCallback, ErrorCallback, RawSampleCallback};
