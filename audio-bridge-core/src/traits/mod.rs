pub mod audio_backend;
pub mod bridge_delegate;
