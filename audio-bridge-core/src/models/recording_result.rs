use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::format::StreamFormat;

/// A finalized recording, as returned by `BridgeController::stop_recording`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub data_bytes: u64,
    pub metadata: RecordingMetadata,
    /// Hex SHA-256 of the whole file, header included.
    pub checksum: String,
}

/// JSON sidecar describing a recording file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub checksum: String,
    pub created_at: String,
    pub data_bytes: u64,
    pub duration_secs: f64,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl RecordingMetadata {
    pub fn new(format: &StreamFormat, data_bytes: u64, file_path: &str, checksum: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            checksum: checksum.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            data_bytes,
            duration_secs: format.duration_secs(data_bytes),
            channels: format.channel_count(),
            sample_rate: format.sample_rate(),
            bits_per_sample: format.bits_per_sample(),
        }
    }
}
