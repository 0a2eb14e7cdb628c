use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::models::error::BridgeError;
use crate::processing::wav_format::{self, WAV_HEADER_SIZE};

/// A stored recording as listed from its directory.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingInfo {
    pub file_name: String,
    pub path: PathBuf,
    /// Whole file, header included.
    pub size_bytes: u64,
    pub channels: u16,
    pub sample_rate: u32,
    pub duration_secs: f64,
}

/// File name for a recording started at `now`, e.g. `2026_10_16_09_30_00.wav`.
pub fn recording_file_name(now: DateTime<Local>) -> String {
    now.format("%Y_%m_%d_%H_%M_%S.wav").to_string()
}

/// Path of a new recording inside `directory`.
pub fn new_recording_path(directory: &Path) -> PathBuf {
    directory.join(recording_file_name(Local::now()))
}

/// Read a recording (header included) for use as a playback source.
pub fn read_recording(path: &Path) -> Result<Vec<u8>, BridgeError> {
    fs::read(path).map_err(|e| BridgeError::StorageError(format!("failed to read {}: {}", path.display(), e)))
}

/// Describe every `.wav` file in `directory`, sorted by file name.
///
/// Files too short to hold a header are skipped.
pub fn list_recordings(directory: &Path) -> Result<Vec<RecordingInfo>, BridgeError> {
    let entries = fs::read_dir(directory)
        .map_err(|e| BridgeError::StorageError(format!("failed to list {}: {}", directory.display(), e)))?;

    let mut recordings = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| BridgeError::StorageError(e.to_string()))?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("wav") {
            continue;
        }
        match recording_info(&path)? {
            Some(info) => recordings.push(info),
            None => log::debug!("skipping {}: shorter than a WAV header", path.display()),
        }
    }

    recordings.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(recordings)
}

fn recording_info(path: &Path) -> Result<Option<RecordingInfo>, BridgeError> {
    let file = File::open(path)
        .map_err(|e| BridgeError::StorageError(format!("failed to open {}: {}", path.display(), e)))?;
    let size_bytes = file
        .metadata()
        .map_err(|e| BridgeError::StorageError(e.to_string()))?
        .len();

    let mut header = Vec::with_capacity(WAV_HEADER_SIZE);
    file.take(WAV_HEADER_SIZE as u64)
        .read_to_end(&mut header)
        .map_err(|e| BridgeError::StorageError(format!("failed to read {}: {}", path.display(), e)))?;
    if header.len() < WAV_HEADER_SIZE {
        return Ok(None);
    }

    let format = wav_format::read_format(&header)?;
    Ok(Some(RecordingInfo {
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        size_bytes,
        channels: format.channel_count(),
        sample_rate: format.sample_rate(),
        duration_secs: format.duration_secs(size_bytes - WAV_HEADER_SIZE as u64),
    }))
}
