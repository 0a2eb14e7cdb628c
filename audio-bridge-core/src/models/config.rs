use std::path::PathBuf;
use std::time::Duration;

use super::format::StreamFormat;
use crate::processing::wav_format::WAV_HEADER_SIZE;

/// Scratch capacity for one capture drain (128 KiB).
pub const DEFAULT_SCRATCH_CAPACITY: usize = 128 * 1024;

/// Configuration for an audio bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfiguration {
    /// PCM format negotiated for both capture and render.
    pub format: StreamFormat,

    /// Device buffer duration requested when opening a session (default: 1 s).
    pub buffer_duration: Duration,

    /// Upper bound on bytes returned by a single capture drain.
    pub scratch_capacity: usize,

    /// Bytes stripped from the front of every playback source.
    pub source_header_size: usize,

    /// Seconds skipped by `skip_forward` (default: 5).
    pub skip_seconds: u32,

    /// Period of the background poll driver (default: 33 ms).
    pub poll_interval: Duration,

    /// Directory where recordings are written.
    pub output_directory: PathBuf,
}

impl BridgeConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.format.channel_count() == 0 {
            return Err("channel count must be positive".into());
        }
        if self.format.sample_rate() == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![8, 16, 24, 32].contains(&self.format.bits_per_sample()) {
            return Err(format!("unsupported bit depth: {}", self.format.bits_per_sample()));
        }
        if self.buffer_duration.is_zero() {
            return Err("buffer duration must be positive".into());
        }
        if self.scratch_capacity < self.format.frame_size_bytes() as usize {
            return Err(format!(
                "scratch capacity {} is smaller than one frame",
                self.scratch_capacity
            ));
        }
        if self.poll_interval.is_zero() {
            return Err("poll interval must be positive".into());
        }
        Ok(())
    }

    /// Buffer duration in 100-nanosecond units, as audio engines expect it.
    pub fn buffer_duration_hns(&self) -> i64 {
        (self.buffer_duration.as_nanos() / 100) as i64
    }
}

impl Default for BridgeConfiguration {
    fn default() -> Self {
        Self {
            format: StreamFormat::default(),
            buffer_duration: Duration::from_secs(1),
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
            source_header_size: WAV_HEADER_SIZE,
            skip_seconds: 5,
            poll_interval: Duration::from_millis(33),
            output_directory: PathBuf::from("."),
        }
    }
}
