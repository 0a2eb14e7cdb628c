use std::path::{Path, PathBuf};

use crate::models::error::BridgeError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::models::state::ControllerMode;
use crate::session::bridge::AudioBridge;
use crate::storage::metadata;
use crate::storage::recordings;
use crate::storage::wav_writer::WavFileWriter;
use crate::traits::audio_backend::AudioBackend;

/// Records capture into WAV files and plays sources back, one mode at a time.
///
/// Call [`poll`](BridgeController::poll) from a periodic timer (or hand the
/// controller to a [`PollDriver`](crate::session::driver::PollDriver)):
/// - recording: drains the capture device into the open file;
/// - playing: feeds the render device, and stops it once it has drained.
pub struct BridgeController<B: AudioBackend> {
    bridge: AudioBridge<B>,
    mode: ControllerMode,
    writer: Option<WavFileWriter>,
}

impl<B: AudioBackend> BridgeController<B> {
    pub fn new(bridge: AudioBridge<B>) -> Self {
        Self {
            bridge,
            mode: ControllerMode::Idle,
            writer: None,
        }
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    pub fn bridge(&self) -> &AudioBridge<B> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut AudioBridge<B> {
        &mut self.bridge
    }

    /// Start capturing into a new timestamped file in the output directory.
    pub fn start_recording(&mut self) -> Result<PathBuf, BridgeError> {
        let path = recordings::new_recording_path(&self.bridge.config().output_directory);
        self.start_recording_to(path)
    }

    /// Start capturing into `path`.
    pub fn start_recording_to(&mut self, path: PathBuf) -> Result<PathBuf, BridgeError> {
        self.ensure_idle()?;

        let mut writer = WavFileWriter::new(path.clone());
        writer.open(self.bridge.format())?;

        if !self.bridge.start_capture() {
            drop(writer);
            std::fs::remove_file(&path).ok();
            return Err(BridgeError::InitializationFailed("capture did not start".into()));
        }

        log::info!("recording to {}", path.display());
        self.writer = Some(writer);
        self.mode = ControllerMode::Recording;
        Ok(path)
    }

    /// Stop capturing, flush what is still queued, and finalize the file.
    pub fn stop_recording(&mut self) -> Result<RecordingResult, BridgeError> {
        if self.mode != ControllerMode::Recording {
            return Err(BridgeError::NotActive);
        }
        let mut writer = self.writer.take().ok_or(BridgeError::NotActive)?;
        self.mode = ControllerMode::Idle;

        let tail = self.bridge.read_available();
        if !self.bridge.stop_capture() {
            log::warn!("capture stop reported failure; finalizing recording anyway");
        }
        writer.write(&tail)?;

        let checksum = writer.close()?;
        let format = *self.bridge.format();
        let data_bytes = writer.data_bytes();
        let duration_secs = format.duration_secs(data_bytes);
        let file_path = writer.file_path().to_path_buf();

        let metadata = RecordingMetadata::new(&format, data_bytes, &file_path.to_string_lossy(), &checksum);
        metadata::write_metadata(&metadata, &file_path)?;

        log::info!(
            "recording finished: {} ({} bytes, {:.2} s)",
            file_path.display(),
            data_bytes,
            duration_secs
        );

        Ok(RecordingResult {
            file_path,
            duration_secs,
            data_bytes,
            metadata,
            checksum,
        })
    }

    /// Recordings stored in the output directory.
    pub fn recordings(&self) -> Result<Vec<recordings::RecordingInfo>, BridgeError> {
        recordings::list_recordings(&self.bridge.config().output_directory)
    }

    /// Load a WAV file and start playing it.
    pub fn start_playback(&mut self, path: &Path) -> Result<(), BridgeError> {
        self.ensure_idle()?;
        let bytes = recordings::read_recording(path)?;
        self.start_playback_bytes(&bytes)
    }

    /// Start playing `bytes` (container header included).
    pub fn start_playback_bytes(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        self.ensure_idle()?;
        self.bridge.set_source(bytes)?;

        if !self.bridge.start_render() {
            return Err(BridgeError::InitializationFailed("render did not start".into()));
        }
        self.mode = ControllerMode::Playing;
        Ok(())
    }

    pub fn stop_playback(&mut self) -> bool {
        if self.mode != ControllerMode::Playing {
            return false;
        }
        self.mode = ControllerMode::Idle;
        self.bridge.stop_render()
    }

    /// Skip playback forward. Ignored unless playing.
    pub fn skip_forward(&mut self) -> bool {
        self.mode == ControllerMode::Playing && self.bridge.skip_forward()
    }

    /// One timer tick. Returns whether the current mode is still running.
    pub fn poll(&mut self) -> bool {
        match self.mode {
            ControllerMode::Idle => false,
            ControllerMode::Recording => {
                let bytes = self.bridge.read_available();
                if bytes.is_empty() {
                    return true;
                }
                if let Some(ref mut writer) = self.writer {
                    if let Err(e) = writer.write(&bytes) {
                        log::error!("failed to write captured audio: {}", e);
                    }
                }
                true
            }
            ControllerMode::Playing => {
                if self.bridge.tick() {
                    return true;
                }
                log::debug!("playback drained");
                self.stop_playback();
                false
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), BridgeError> {
        match self.mode {
            ControllerMode::Idle => Ok(()),
            _ => Err(BridgeError::AlreadyActive),
        }
    }
}
