use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Recording device (microphone).
    Capture,
    /// Output device (speakers, headset).
    Playback,
}

impl Direction {
    pub fn is_capture(self) -> bool {
        matches!(self, Self::Capture)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture => f.write_str("capture"),
            Self::Playback => f.write_str("playback"),
        }
    }
}

/// A device resolved from the native device list.
///
/// Not cached: the native list can change at any time, so an identity is
/// only meaningful for the open call that immediately follows resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    pub name: String,
    pub direction: Direction,
}

/// Native handle of an opened device. Zero is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceHandle(pub u32);

impl DeviceHandle {
    pub const INVALID: DeviceHandle = DeviceHandle(0);

    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Status reported by the native subsystem for an opened handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// Closed, unknown, or disconnected by the system.
    Stopped,
    Playing,
    Paused,
}
