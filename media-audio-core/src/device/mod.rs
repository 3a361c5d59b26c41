pub mod directory;
pub mod mock;
pub mod runtime;
