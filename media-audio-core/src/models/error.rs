use thiserror::Error;

use super::device::Direction;

/// Errors raised by device resolution, device sessions and the endpoint
/// controllers.
///
/// The `Display` text is what error subscribers receive, so every
/// device-related variant carries the device name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("no {direction} device matches [{query}]")]
    DeviceNotFound { direction: Direction, query: String },

    #[error("failed to initialise {direction} device [{name}] at {clock_rate} Hz: {reason}")]
    DeviceInitFailed {
        direction: Direction,
        name: String,
        clock_rate: u32,
        reason: String,
    },

    #[error("{direction} device [{name}] stopped")]
    DeviceDisconnected { direction: Direction, name: String },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("audio encoder unavailable: {0}")]
    EncoderUnavailable(String),

    #[error("native audio library initialisation failed: {0}")]
    LibraryInitFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("audio backend error on [{name}]: {reason}")]
    Backend { name: String, reason: String },
}

impl AudioError {
    /// Whether the error came from the device going away underneath an
    /// active session rather than from a failed request.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, Self::DeviceDisconnected { .. })
    }
}
