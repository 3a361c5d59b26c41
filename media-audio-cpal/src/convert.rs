//! Sample conversions between cpal stream buffers and the mono 16-bit
//! little-endian byte queues the core works with.
//!
//! Capture downmixes interleaved frames by averaging channels; playback
//! copies the mono sample to every channel. Missing playback data is
//! rendered as silence.

const I16_SCALE: f32 = i16::MAX as f32;

pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * I16_SCALE).clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / I16_SCALE
}

/// Append interleaved `i16` frames to `out` as mono LE bytes.
pub fn i16_frames_to_mono_bytes(data: &[i16], channels: usize, out: &mut Vec<u8>) {
    let channels = channels.max(1);
    for frame in data.chunks_exact(channels) {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        let mono = (sum / channels as i32) as i16;
        out.extend_from_slice(&mono.to_le_bytes());
    }
}

/// Append interleaved `f32` frames to `out` as mono LE bytes.
pub fn f32_frames_to_mono_bytes(data: &[f32], channels: usize, out: &mut Vec<u8>) {
    let channels = channels.max(1);
    for frame in data.chunks_exact(channels) {
        let mono = frame.iter().sum::<f32>() / channels as f32;
        out.extend_from_slice(&f32_to_i16(mono).to_le_bytes());
    }
}

/// Fill interleaved `i16` frames from mono LE bytes; frames past the end of
/// `bytes` are silent.
pub fn mono_bytes_to_i16_frames(bytes: &[u8], channels: usize, out: &mut [i16]) {
    let channels = channels.max(1);
    let mut samples = bytes.chunks_exact(2).map(|pair| i16::from_le_bytes([pair[0], pair[1]]));
    for frame in out.chunks_mut(channels) {
        frame.fill(samples.next().unwrap_or(0));
    }
}

/// Fill interleaved `f32` frames from mono LE bytes; frames past the end of
/// `bytes` are silent.
pub fn mono_bytes_to_f32_frames(bytes: &[u8], channels: usize, out: &mut [f32]) {
    let channels = channels.max(1);
    let mut samples = bytes
        .chunks_exact(2)
        .map(|pair| i16_to_f32(i16::from_le_bytes([pair[0], pair[1]])));
    for frame in out.chunks_mut(channels) {
        frame.fill(samples.next().unwrap_or(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stereo_capture_is_averaged() {
        let mut out = Vec::new();
        i16_frames_to_mono_bytes(&[100, 300, -50, -150], 2, &mut out);
        assert_eq!(out, [200i16.to_le_bytes(), (-100i16).to_le_bytes()].concat());
    }

    #[test]
    fn float_capture_is_clamped() {
        let mut out = Vec::new();
        f32_frames_to_mono_bytes(&[2.0, -2.0, 0.0], 1, &mut out);
        let samples: Vec<i16> = out.chunks_exact(2).map(|p| i16::from_le_bytes([p[0], p[1]])).collect();
        assert_eq!(samples, vec![i16::MAX, i16::MIN, 0]);
    }

    #[test]
    fn partial_frames_are_ignored() {
        let mut out = Vec::new();
        i16_frames_to_mono_bytes(&[1, 2, 3], 2, &mut out);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn playback_duplicates_and_pads_with_silence() {
        let bytes = [5i16.to_le_bytes(), (-7i16).to_le_bytes()].concat();
        let mut out = [99i16; 6];
        mono_bytes_to_i16_frames(&bytes, 2, &mut out);
        assert_eq!(out, [5, 5, -7, -7, 0, 0]);
    }

    #[test]
    fn float_playback_round_trips_full_scale() {
        let bytes = i16::MAX.to_le_bytes();
        let mut out = [0.5f32; 2];
        mono_bytes_to_f32_frames(&bytes, 1, &mut out);
        assert_eq!(out, [1.0, 0.0]);
    }
}
