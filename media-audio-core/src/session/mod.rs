pub mod audio_sink;
pub mod audio_source;
pub mod capture_loop;
pub mod device_session;
pub(crate) mod endpoint;
pub mod format_manager;
pub mod playback_feeder;
pub mod subscribers;
