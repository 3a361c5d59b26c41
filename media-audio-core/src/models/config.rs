use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::AudioError;

/// Default delay between two polls of the capture queue, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 16;

/// Configuration for an audio source or sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Native device name. Empty selects the subsystem default device.
    pub device_name: String,

    /// Capture chunk length in samples.
    ///
    /// `None` asks the encoder for its preferred frame size; `Some(0)`
    /// dequeues everything available on each poll.
    pub frame_size: Option<u32>,

    /// Delay between two polls of the capture queue (default: 16 ms).
    pub poll_interval_ms: u64,
}

impl EndpointConfig {
    pub fn for_device(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Self::default()
        }
    }

    pub fn with_frame_size(mut self, frame_size: u32) -> Self {
        self.frame_size = Some(frame_size);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_ms == 0 {
            return Err("poll interval must be positive".into());
        }
        if let Some(frame_size) = self.frame_size {
            if frame_size > u16::MAX as u32 {
                return Err(format!("frame size {} exceeds {} samples", frame_size, u16::MAX));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self, AudioError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AudioError::InvalidConfiguration(format!("failed to parse config: {}", e)))?;
        config.validate().map_err(AudioError::InvalidConfiguration)?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AudioError> {
        let json = fs::read_to_string(path).map_err(|e| {
            AudioError::InvalidConfiguration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            device_name: String::new(),
            frame_size: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}
