pub mod source_buffer;
pub mod wav_format;
