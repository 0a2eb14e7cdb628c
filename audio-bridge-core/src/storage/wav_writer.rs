use std::fs::{self, File};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;
use crate::processing::wav_format;

/// Streaming PCM WAV file writer.
///
/// ## File Format
/// ```text
/// [44-byte WAV header]
/// [raw PCM data...]
/// ```
///
/// The header is written with zero sizes on open and patched on close.
pub struct WavFileWriter {
    file_path: PathBuf,
    file: Option<BufWriter<File>>,
    data_bytes: u64,
}

impl WavFileWriter {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            file: None,
            data_bytes: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Create the file and write a placeholder header for `format`.
    pub fn open(&mut self, format: &StreamFormat) -> Result<(), BridgeError> {
        if self.is_open() {
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| BridgeError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&self.file_path)
            .map_err(|e| BridgeError::StorageError(format!("failed to create file: {}", e)))?;
        let mut file = BufWriter::new(file);

        file.write_all(&wav_format::generate_wav_header(format, 0))
            .map_err(|e| BridgeError::StorageError(format!("header write failed: {}", e)))?;

        self.file = Some(file);
        self.data_bytes = 0;
        Ok(())
    }

    /// Append raw PCM. Fails once the payload would outgrow a 32-bit RIFF header.
    pub fn write(&mut self, data: &[u8]) -> Result<(), BridgeError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| BridgeError::StorageError("file is not open for writing".into()))?;
        if self.data_bytes + data.len() as u64 > wav_format::MAX_DATA_SIZE {
            return Err(BridgeError::StorageError(format!(
                "recording would exceed {} bytes of audio",
                wav_format::MAX_DATA_SIZE
            )));
        }
        file.write_all(data)
            .map_err(|e| BridgeError::StorageError(format!("write failed: {}", e)))?;
        self.data_bytes += data.len() as u64;
        Ok(())
    }

    /// Patch the header sizes, close the file, and return its SHA-256.
    pub fn close(&mut self) -> Result<String, BridgeError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| BridgeError::StorageError("file is not open".into()))?;

        for (offset, value) in wav_format::size_patches(self.data_bytes) {
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| BridgeError::StorageError(e.to_string()))?;
            file.write_all(&value.to_le_bytes())
                .map_err(|e| BridgeError::StorageError(e.to_string()))?;
        }
        file.flush().map_err(|e| BridgeError::StorageError(e.to_string()))?;
        drop(file);

        sha256_file(&self.file_path)
    }

    /// PCM bytes written so far, header excluded.
    pub fn data_bytes(&self) -> u64 {
        self.data_bytes
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Compute the SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, BridgeError> {
    let data = fs::read(path)
        .map_err(|e| BridgeError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
