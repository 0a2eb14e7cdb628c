//! WAV container helpers.
//!
//! Recordings carry a canonical 44-byte RIFF header; playback sources are
//! expected to start with one and have it stripped unread.

use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;

/// Size of the canonical PCM RIFF/WAVE header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Byte offset of the RIFF chunk size field.
const RIFF_SIZE_OFFSET: usize = 4;

/// Byte offset of the data chunk size field.
const DATA_SIZE_OFFSET: usize = 40;

/// Generate a 44-byte PCM WAV header for `format`.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16
/// [20-21]  1 (PCM)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate
/// [32-33]  block_align
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(format: &StreamFormat, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&(36 + data_size).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channel_count().to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate().to_le_bytes());
    header[28..32].copy_from_slice(&format.avg_bytes_per_sec().to_le_bytes());
    header[32..34].copy_from_slice(&(format.frame_size_bytes() as u16).to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample().to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Largest payload a 32-bit RIFF header can describe.
pub const MAX_DATA_SIZE: u64 = u32::MAX as u64 - 36;

/// File offsets and values that finalize a header once the payload size is known.
///
/// Sizes past [`MAX_DATA_SIZE`] saturate.
pub fn size_patches(data_size: u64) -> [(u64, u32); 2] {
    let data_size = data_size.min(MAX_DATA_SIZE) as u32;
    [
        (RIFF_SIZE_OFFSET as u64, data_size + 36),
        (DATA_SIZE_OFFSET as u64, data_size),
    ]
}

/// Read the PCM format fields of a canonical header.
pub fn read_format(header: &[u8]) -> Result<StreamFormat, BridgeError> {
    if header.len() < WAV_HEADER_SIZE {
        return Err(BridgeError::InvalidSourceLength {
            len: header.len(),
            header: WAV_HEADER_SIZE,
        });
    }
    let channels = u16::from_le_bytes([header[22], header[23]]);
    let sample_rate = u32::from_le_bytes([header[24], header[25], header[26], header[27]]);
    let bits = u16::from_le_bytes([header[34], header[35]]);
    Ok(StreamFormat::build(channels, sample_rate, bits))
}

/// Return the payload after a `header_size`-byte prefix.
///
/// The header is not inspected.
pub fn strip_header(bytes: &[u8], header_size: usize) -> Result<&[u8], BridgeError> {
    bytes.get(header_size..).ok_or(BridgeError::InvalidSourceLength {
        len: bytes.len(),
        header: header_size,
    })
}
