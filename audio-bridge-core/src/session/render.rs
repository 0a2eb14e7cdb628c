use crate::models::config::BridgeConfiguration;
use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;
use crate::models::state::SessionState;
use crate::processing::source_buffer::SourceBuffer;
use crate::processing::wav_format;
use crate::traits::audio_backend::{AudioBackend, RenderEndpoint};

/// What one feeder tick committed to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// `frames` frames of source audio were written.
    Audio { frames: u32 },
    /// The region was released empty with the silent flag.
    Silence,
}

/// Result of one successful feeder tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub commit: Commit,
    /// Frames still queued on the device after the commit.
    pub padding: u32,
}

impl Tick {
    /// The device still has audio queued.
    pub fn is_playing(&self) -> bool {
        self.padding > 0
    }
}

/// Render session: owns the opened endpoint while active, and the playback
/// source independently of it.
pub struct RenderSession<E: RenderEndpoint> {
    endpoint: Option<E>,
    source: Option<SourceBuffer>,
    format: StreamFormat,
    header_size: usize,
    skip_seconds: u32,
}

impl<E: RenderEndpoint> RenderSession<E> {
    pub fn new(config: &BridgeConfiguration) -> Self {
        Self {
            endpoint: None,
            source: None,
            format: config.format,
            header_size: config.source_header_size,
            skip_seconds: config.skip_seconds,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.endpoint.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    pub fn format(&self) -> &StreamFormat {
        &self.format
    }

    pub fn source(&self) -> Option<&SourceBuffer> {
        self.source.as_ref()
    }

    /// Open the default render endpoint and start streaming.
    pub fn start<B>(&mut self, backend: &mut B, config: &BridgeConfiguration) -> Result<(), BridgeError>
    where
        B: AudioBackend<Render = E>,
    {
        if self.endpoint.is_some() {
            return Err(BridgeError::AlreadyActive);
        }

        let mut endpoint = backend.open_render(&self.format, config)?;
        endpoint.start()?;

        log::info!(
            "render started: {} ch, {} Hz, {} bit",
            self.format.channel_count(),
            self.format.sample_rate(),
            self.format.bits_per_sample()
        );
        self.endpoint = Some(endpoint);
        Ok(())
    }

    /// Stop streaming and release the endpoint. The source is kept.
    pub fn stop(&mut self) -> Result<(), BridgeError> {
        let mut endpoint = self.endpoint.take().ok_or(BridgeError::NotActive)?;
        let result = endpoint.stop();
        drop(endpoint);

        match &result {
            Ok(()) => log::info!("render stopped"),
            Err(e) => log::warn!("render stop failed, handles released anyway: {}", e),
        }
        result
    }

    /// Replace the playback source with `bytes` minus its container header.
    ///
    /// Inputs shorter than the header are rejected and the current source
    /// is kept.
    pub fn set_source(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        let payload = wav_format::strip_header(bytes, self.header_size)?;
        log::debug!("playback source set: {} bytes", payload.len());
        self.source = Some(SourceBuffer::new(payload.to_vec()));
        Ok(())
    }

    /// Jump the cursor forward by the configured number of seconds.
    ///
    /// A skip that would reach the end of the source is rejected outright.
    pub fn skip_forward(&mut self) -> bool {
        let skip = self.format.skip_bytes(self.skip_seconds);
        let skipped = self.source.as_mut().is_some_and(|source| source.skip(skip));
        if skipped {
            log::debug!("skipped {} bytes", skip);
        }
        skipped
    }

    /// Fill the free part of the device ring buffer.
    ///
    /// Returns `Err(NotActive)` when idle. Any device failure aborts the
    /// tick; failures before the commit leave the cursor where it was.
    pub fn feed(&mut self) -> Result<Tick, BridgeError> {
        let endpoint = self.endpoint.as_mut().ok_or(BridgeError::NotActive)?;
        let frame_size = self.format.frame_size_bytes() as usize;

        let capacity = endpoint.buffer_frames()?;
        let padding = endpoint.padding_frames()?;
        let available = capacity.checked_sub(padding).ok_or_else(|| {
            BridgeError::DeviceCall(format!("padding {} exceeds buffer of {} frames", padding, capacity))
        })?;
        let bytes = available as usize * frame_size;

        let region = endpoint.acquire_region(available)?;
        let commit = match self.source.as_mut().and_then(|source| source.take(bytes)) {
            Some(chunk) => {
                region[..bytes].copy_from_slice(chunk);
                Commit::Audio { frames: available }
            }
            None => Commit::Silence,
        };

        match commit {
            Commit::Audio { frames } => endpoint.release_region(frames, false)?,
            Commit::Silence => endpoint.release_region(0, true)?,
        }

        let padding = endpoint.padding_frames()?;
        Ok(Tick { commit, padding })
    }
}
