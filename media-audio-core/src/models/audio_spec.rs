use super::audio_format::{AudioFormat, DEFAULT_CLOCK_RATE};

/// Native sample encoding. Only signed 16-bit little-endian is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    S16Le,
}

impl SampleFormat {
    pub fn bits(self) -> u16 {
        match self {
            Self::S16Le => 16,
        }
    }
}

/// Capability spec a device is opened with.
///
/// Fixed for the lifetime of one opened device; a different spec means
/// closing and reopening the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioSpec {
    pub clock_rate: u32,
    pub channels: u16,
    pub sample_format: SampleFormat,
    /// Requested native buffer length in sample frames (0 = subsystem default).
    pub samples: u16,
}

impl AudioSpec {
    /// Mono signed 16-bit spec at `clock_rate`.
    pub fn mono_s16(clock_rate: u32, samples: u16) -> Self {
        Self {
            clock_rate,
            channels: 1,
            sample_format: SampleFormat::S16Le,
            samples,
        }
    }

    pub fn for_format(format: &AudioFormat, samples: u16) -> Self {
        Self::mono_s16(format.clock_rate, samples)
    }

    pub fn bytes_per_sample(&self) -> usize {
        self.channels as usize * (self.sample_format.bits() as usize / 8)
    }

    pub fn bytes_per_second(&self) -> usize {
        self.clock_rate as usize * self.bytes_per_sample()
    }
}

impl Default for AudioSpec {
    fn default() -> Self {
        Self::mono_s16(DEFAULT_CLOCK_RATE, 0)
    }
}
