pub mod metadata;
pub mod recordings;
pub mod wav_writer;
