pub mod audio_format;
pub mod audio_spec;
pub mod config;
pub mod device;
pub mod error;
pub mod state;
