pub mod audio_encoder;
pub mod audio_subsystem;
pub mod endpoint_events;
