//! Capture → G.711 μ-law → playback loopback.
//!
//! ```text
//! loopback [capture-prefix] [playback-prefix] [seconds]
//! ```
//!
//! Devices are picked by case-insensitive name prefix. A missing prefix, or
//! one nothing matches, selects the system default device. Set `RUST_LOG=debug` for lifecycle logging.

use std::env;
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use media_audio_core::{
    AudioEncoder, AudioError, AudioFormat, AudioSink, AudioSource, DeviceDirectory, Direction, EndpointConfig,
};

const DEFAULT_SECONDS: u64 = 10;

/// Narrowband G.711 μ-law codec, 20 ms frames.
struct MuLaw;

impl MuLaw {
    const BIAS: i32 = 0x84;
    const CLIP: i32 = 32635;

    fn encode_sample(sample: i16) -> u8 {
        let mut value = sample as i32;
        let sign = if value < 0 {
            value = -value;
            0x80
        } else {
            0
        };
        value = value.min(Self::CLIP) + Self::BIAS;

        let mut exponent = 7;
        let mut mask = 0x4000;
        while exponent > 0 && value & mask == 0 {
            exponent -= 1;
            mask >>= 1;
        }
        let mantissa = (value >> (exponent + 3)) & 0x0f;
        !(sign | (exponent << 4) | mantissa) as u8
    }

    fn decode_sample(byte: u8) -> i16 {
        let byte = !byte;
        let exponent = ((byte >> 4) & 0x07) as i32;
        let mantissa = (byte & 0x0f) as i32;
        let magnitude = (((mantissa << 3) + Self::BIAS) << exponent) - Self::BIAS;
        if byte & 0x80 != 0 {
            -magnitude as i16
        } else {
            magnitude as i16
        }
    }
}

impl AudioEncoder for MuLaw {
    fn supported_formats(&self) -> Vec<AudioFormat> {
        vec![AudioFormat::pcmu()]
    }

    fn encode_audio(&self, pcm: &[i16], _format: &AudioFormat) -> Vec<u8> {
        pcm.iter().map(|&s| Self::encode_sample(s)).collect()
    }

    fn decode_audio(&self, encoded: &[u8], _format: &AudioFormat) -> Vec<i16> {
        encoded.iter().map(|&b| Self::decode_sample(b)).collect()
    }

    fn frame_size(&self) -> u32 {
        160
    }
}

/// Device name for `prefix`; an empty name opens the system default.
fn pick_device(directory: &DeviceDirectory, direction: Direction, prefix: &str) -> Result<String, AudioError> {
    if prefix.is_empty() {
        return Ok(String::new());
    }
    Ok(directory.resolve_by_prefix(direction, prefix)?.name)
}

fn label(name: &str) -> &str {
    if name.is_empty() {
        "system default"
    } else {
        name
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let capture_prefix = args.next().unwrap_or_default();
    let playback_prefix = args.next().unwrap_or_default();
    let seconds = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => DEFAULT_SECONDS,
    };

    let runtime = media_audio_cpal::shared_runtime();
    let directory = DeviceDirectory::new(Arc::clone(&runtime));
    for direction in [Direction::Capture, Direction::Playback] {
        for (index, name) in directory.list_devices(direction)?.iter().enumerate() {
            log::info!("{} device {}: {}", direction, index, name);
        }
    }

    let mic = pick_device(&directory, Direction::Capture, &capture_prefix)?;
    let speaker = pick_device(&directory, Direction::Playback, &playback_prefix)?;
    log::info!("Looping [{}] → [{}] for {} s", label(&mic), label(&speaker), seconds);

    let codec: Arc<dyn AudioEncoder> = Arc::new(MuLaw);
    let format = AudioFormat::pcmu();

    let mut sink = AudioSink::new(Arc::clone(&runtime), Arc::clone(&codec), EndpointConfig::for_device(speaker))?;
    sink.on_error(Arc::new(|err: &AudioError| log::error!("Playback failed: {}", err)));
    sink.set_format(&format)?;
    let sink = Arc::new(sink);

    let mut source = AudioSource::new(Arc::clone(&runtime), codec, EndpointConfig::for_device(mic))?;
    source.on_error(Arc::new(|err: &AudioError| log::error!("Capture failed: {}", err)));
    let playback = Arc::clone(&sink);
    source.on_encoded_sample(Arc::new(move |_duration: u32, payload: &[u8]| {
        playback.got_encoded_sample(payload);
    }));
    source.set_format(&format)?;

    thread::sleep(Duration::from_secs(seconds));

    source.close();
    log::info!("{} bytes left in the playback queue", sink.queued_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use media_audio_core::{AudioRuntime, MockAudioSubsystem};

    use super::*;

    #[test]
    fn empty_prefix_keeps_the_system_default() {
        let mock = MockAudioSubsystem::with_devices(&["Built-in Mic", "USB Mic"], &["Speakers", "USB Headset"]);
        let directory = DeviceDirectory::new(AudioRuntime::new(mock));

        assert_eq!(pick_device(&directory, Direction::Capture, "").unwrap(), "");
        assert_eq!(pick_device(&directory, Direction::Capture, "usb").unwrap(), "USB Mic");
        assert_eq!(pick_device(&directory, Direction::Playback, "hdmi").unwrap(), "Speakers");
        assert_eq!(label(""), "system default");
    }

    #[test]
    fn mu_law_reference_points() {
        assert_eq!(MuLaw::encode_sample(0), 0xff);
        assert_eq!(MuLaw::decode_sample(0xff), 0);
        assert_eq!(MuLaw::encode_sample(i16::MAX), 0x80);
        assert_eq!(MuLaw::encode_sample(i16::MIN), 0x00);
    }

    #[test]
    fn mu_law_error_stays_within_segment_step() {
        for sample in [-30000i16, -1000, -40, 40, 1000, 30000] {
            let decoded = MuLaw::decode_sample(MuLaw::encode_sample(sample));
            let error = (decoded as i32 - sample as i32).abs();
            assert!(error <= (sample as i32).abs() / 16 + 8, "{} -> {}", sample, decoded);
        }
    }
}
