use serde::{Deserialize, Serialize};

/// Clock rate used when nothing else has been negotiated (narrowband).
pub const DEFAULT_CLOCK_RATE: u32 = 8000;

/// A codec format offered by the encoder and negotiated with the remote peer.
///
/// `clock_rate` is the PCM rate the device runs at; `rtp_clock_rate` is the
/// rate of the timestamps on the wire. They differ for G.722 (16 kHz audio,
/// 8 kHz RTP clock).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub format_id: u8,
    pub format_name: String,
    pub clock_rate: u32,
    pub rtp_clock_rate: u32,
    #[serde(default = "default_channel_count")]
    pub channel_count: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

fn default_channel_count() -> u16 {
    1
}

impl AudioFormat {
    pub fn new(format_id: u8, format_name: &str, clock_rate: u32, rtp_clock_rate: u32) -> Self {
        Self {
            format_id,
            format_name: format_name.to_string(),
            clock_rate,
            rtp_clock_rate,
            channel_count: 1,
            parameters: None,
        }
    }

    pub fn pcmu() -> Self {
        Self::new(0, "PCMU", DEFAULT_CLOCK_RATE, DEFAULT_CLOCK_RATE)
    }

    pub fn pcma() -> Self {
        Self::new(8, "PCMA", DEFAULT_CLOCK_RATE, DEFAULT_CLOCK_RATE)
    }

    pub fn g722() -> Self {
        Self::new(9, "G722", DEFAULT_CLOCK_RATE * 2, DEFAULT_CLOCK_RATE)
    }

    pub fn opus() -> Self {
        let mut format = Self::new(111, "OPUS", 48000, 48000);
        format.parameters = Some("useinbandfec=1".into());
        format
    }

    /// Codec identity check used for negotiation: id, name (case-insensitive),
    /// clock rate and channel count. Format parameters are not compared.
    pub fn matches(&self, other: &AudioFormat) -> bool {
        self.format_id == other.format_id
            && self.format_name.eq_ignore_ascii_case(&other.format_name)
            && self.clock_rate == other.clock_rate
            && self.channel_count == other.channel_count
    }

    /// Convert a sample count at `clock_rate` into RTP timestamp units.
    pub fn rtp_duration(&self, sample_count: usize) -> u32 {
        if self.clock_rate == 0 {
            return 0;
        }
        (sample_count as u64 * self.rtp_clock_rate as u64 / self.clock_rate as u64) as u32
    }

    pub fn sampling_rate(&self) -> AudioSamplingRate {
        AudioSamplingRate::classify(self.clock_rate)
    }
}

/// Coarse sampling-rate class attached to raw-sample events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSamplingRate {
    Rate8KHz,
    Rate16KHz,
}

impl AudioSamplingRate {
    /// 16 kHz devices are wideband; everything else is reported as 8 kHz.
    pub fn classify(clock_rate: u32) -> Self {
        if clock_rate == DEFAULT_CLOCK_RATE * 2 {
            Self::Rate16KHz
        } else {
            Self::Rate8KHz
        }
    }

    pub fn hz(self) -> u32 {
        match self {
            Self::Rate8KHz => 8000,
            Self::Rate16KHz => 16000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn g722_duration_is_scaled_to_rtp_clock() {
        let g722 = AudioFormat::g722();
        assert_eq!(g722.rtp_duration(320), 160);
        assert_eq!(AudioFormat::pcmu().rtp_duration(160), 160);
    }

    #[test]
    fn classification_follows_clock_rate() {
        assert_eq!(AudioFormat::g722().sampling_rate(), AudioSamplingRate::Rate16KHz);
        assert_eq!(AudioFormat::pcma().sampling_rate(), AudioSamplingRate::Rate8KHz);
        assert_eq!(AudioFormat::opus().sampling_rate(), AudioSamplingRate::Rate8KHz);
    }

    #[test]
    fn matching_ignores_name_case_and_parameters() {
        let mut other = AudioFormat::opus();
        other.format_name = "opus".into();
        other.parameters = None;
        assert!(AudioFormat::opus().matches(&other));
        assert!(!AudioFormat::pcmu().matches(&AudioFormat::pcma()));
    }

    #[test]
    fn deserializes_with_default_channels() {
        let json = r#"{"format_id":0,"format_name":"PCMU","clock_rate":8000,"rtp_clock_rate":8000}"#;
        let format: AudioFormat = serde_json::from_str(json).unwrap();
        assert_eq!(format, AudioFormat::pcmu());
    }
}
