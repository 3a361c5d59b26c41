use crate::models::audio_format::AudioFormat;

/// Chunk length, in samples, used when neither the configuration nor the
/// encoder asks for something else.
pub const DEFAULT_FRAME_SIZE: u32 = 1920;

/// Codec collaborator used by the endpoints.
///
/// Called synchronously inline: `encode_audio` runs on the capture thread,
/// `decode_audio` on whichever thread hands a payload to the sink.
pub trait AudioEncoder: Send + Sync {
    /// Formats this encoder can produce, in preference order.
    fn supported_formats(&self) -> Vec<AudioFormat>;

    /// Encode mono PCM samples. An empty result means "nothing to send yet".
    fn encode_audio(&self, pcm: &[i16], format: &AudioFormat) -> Vec<u8>;

    fn decode_audio(&self, encoded: &[u8], format: &AudioFormat) -> Vec<i16>;

    /// Preferred capture chunk length in samples.
    fn frame_size(&self) -> u32 {
        DEFAULT_FRAME_SIZE
    }
}
