//! Signed 16-bit little-endian PCM conversions.

/// Bytes per mono 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Decode little-endian 16-bit PCM bytes into samples (stride 2).
///
/// A trailing odd byte is ignored.
pub fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode samples as little-endian 16-bit PCM. Output length = `samples.len() * 2`.
pub fn samples_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * BYTES_PER_SAMPLE);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

/// Round a byte count down to a whole number of samples.
pub fn whole_samples(byte_len: usize) -> usize {
    byte_len - byte_len % BYTES_PER_SAMPLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_pairs() {
        let bytes = [0x01, 0x00, 0xff, 0x7f, 0x00, 0x80, 0xff, 0xff];
        assert_eq!(bytes_to_samples(&bytes), vec![1, i16::MAX, i16::MIN, -1]);
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        assert_eq!(bytes_to_samples(&[0x10, 0x00, 0x20]), vec![16]);
        assert!(bytes_to_samples(&[0x10]).is_empty());
    }

    #[test]
    fn encodes_little_endian() {
        assert_eq!(samples_to_bytes(&[1, -2]), vec![0x01, 0x00, 0xfe, 0xff]);
        assert!(samples_to_bytes(&[]).is_empty());
    }

    #[test]
    fn whole_samples_rounds_down() {
        assert_eq!(whole_samples(0), 0);
        assert_eq!(whole_samples(7), 6);
        assert_eq!(whole_samples(3840), 3840);
    }
}
