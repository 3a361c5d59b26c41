use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::AudioError;
use crate::session::device_session::DeviceSession;

/// Pushes PCM into an open playback device.
///
/// Meant for a single producer thread; concurrent submitters serialise on the
/// session lock with no ordering guarantee between them.
#[derive(Debug, Clone)]
pub struct PlaybackFeeder {
    session: Arc<Mutex<DeviceSession>>,
}

impl PlaybackFeeder {
    pub fn new(session: Arc<Mutex<DeviceSession>>) -> Self {
        Self { session }
    }

    /// Queue 16-bit little-endian mono PCM for playback.
    ///
    /// Silently ignored while the device is closed. A device that reports
    /// itself stopped yields `DeviceDisconnected`.
    pub fn submit(&self, pcm: &[u8]) -> Result<(), AudioError> {
        let session = self.session.lock();
        if !session.is_open() {
            return Ok(());
        }
        if session.is_stopped() {
            return Err(AudioError::DeviceDisconnected {
                direction: session.direction(),
                name: session.name().to_string(),
            });
        }
        session.enqueue(pcm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockAudioSubsystem;
    use crate::device::runtime::AudioRuntime;
    use crate::models::audio_spec::AudioSpec;
    use crate::models::device::Direction;

    fn feeder() -> (Arc<MockAudioSubsystem>, Arc<Mutex<DeviceSession>>, PlaybackFeeder) {
        let mock = Arc::new(MockAudioSubsystem::with_devices(&[], &["Speakers"]));
        let runtime = AudioRuntime::new(Arc::clone(&mock));
        let session = Arc::new(Mutex::new(DeviceSession::new(runtime, Direction::Playback)));
        (mock, Arc::clone(&session), PlaybackFeeder::new(session))
    }

    #[test]
    fn closed_device_drops_audio_silently() {
        let (mock, _session, feeder) = feeder();
        assert!(feeder.submit(&[0u8; 320]).is_ok());
        assert_eq!(mock.open_count(), 0);
    }

    #[test]
    fn open_device_queue_grows_by_submitted_bytes() {
        let (mock, session, feeder) = feeder();
        let handle = session.lock().open("Speakers", AudioSpec::default()).unwrap();

        feeder.submit(&[0u8; 1920]).unwrap();
        assert_eq!(mock.queue_len(handle), 1920);
        feeder.submit(&[0u8; 2]).unwrap();
        assert_eq!(session.lock().queued_bytes(), 1922);
    }

    #[test]
    fn stopped_device_is_reported() {
        let (mock, session, feeder) = feeder();
        let handle = session.lock().open("Speakers", AudioSpec::default()).unwrap();
        mock.disconnect(handle);

        let err = feeder.submit(&[0u8; 4]).unwrap_err();
        assert_eq!(
            err,
            AudioError::DeviceDisconnected {
                direction: Direction::Playback,
                name: "Speakers".into()
            }
        );
        assert_eq!(mock.queue_len(handle), 0);
    }
}
