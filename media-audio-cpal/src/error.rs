use thiserror::Error;

use media_audio_core::Direction;

/// Failures inside the cpal backend. They cross the `AudioSubsystem`
/// boundary as their `Display` text.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Audio subsystem is not initialized")]
    NotInitialised,

    #[error("No such {direction} device [{name}]")]
    NoSuchDevice { direction: Direction, name: String },

    #[error("[{name}] has no i16/f32 stream configuration at {clock_rate} Hz")]
    UnsupportedRate { name: String, clock_rate: u32 },

    #[error("failed to query stream configurations: {0}")]
    SupportedConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[error("failed to build stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to control stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("failed to spawn stream worker: {0}")]
    Spawn(String),

    #[error("stream worker exited before the device opened")]
    WorkerGone,
}
