use std::sync::Arc;

use crate::models::config::BridgeConfiguration;
use crate::models::diagnostics::BridgeDiagnostics;
use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;
use crate::models::state::{SessionState, StreamKind};
use crate::session::capture::CaptureSession;
use crate::session::render::{Commit, RenderSession};
use crate::traits::audio_backend::AudioBackend;
use crate::traits::bridge_delegate::BridgeDelegate;

/// Poll-driven capture/render bridge over an [`AudioBackend`].
///
/// Capture and render are independent sessions; both may be active at once.
/// Nothing here owns a thread: callers poll [`read_available`] and [`tick`]
/// from their own timer, one call at a time (`&mut self`).
///
/// Failures never cross this surface as errors. Start/stop/tick report
/// `false`, drains return whatever was copied, and the cause goes to the log
/// and to the delegate.
///
/// [`read_available`]: AudioBridge::read_available
/// [`tick`]: AudioBridge::tick
pub struct AudioBridge<B: AudioBackend> {
    backend: B,
    config: BridgeConfiguration,
    capture: CaptureSession<B::Capture>,
    render: RenderSession<B::Render>,
    delegate: Option<Arc<dyn BridgeDelegate>>,
    diagnostics: BridgeDiagnostics,
}

impl<B: AudioBackend> AudioBridge<B> {
    pub fn new(backend: B, config: BridgeConfiguration) -> Result<Self, BridgeError> {
        config.validate().map_err(BridgeError::InvalidConfiguration)?;
        Ok(Self::with_config(backend, config))
    }

    /// Bridge on the default configuration, which always validates.
    pub fn with_defaults(backend: B) -> Self {
        Self::with_config(backend, BridgeConfiguration::default())
    }

    fn with_config(backend: B, config: BridgeConfiguration) -> Self {
        Self {
            capture: CaptureSession::new(&config),
            render: RenderSession::new(&config),
            backend,
            config,
            delegate: None,
            diagnostics: BridgeDiagnostics::default(),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn BridgeDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &BridgeConfiguration {
        &self.config
    }

    pub fn format(&self) -> &StreamFormat {
        &self.config.format
    }

    pub fn capture_state(&self) -> SessionState {
        self.capture.state()
    }

    pub fn render_state(&self) -> SessionState {
        self.render.state()
    }

    pub fn diagnostics(&self) -> &BridgeDiagnostics {
        &self.diagnostics
    }

    /// Playback cursor and source length, if a source is set.
    pub fn playback_position(&self) -> Option<(usize, usize)> {
        self.render.source().map(|s| (s.cursor(), s.len()))
    }

    /// Start capturing from the default input device.
    ///
    /// Returns `false` without touching the device when capture is already
    /// running, and `false` when opening or starting the device fails.
    pub fn start_capture(&mut self) -> bool {
        let result = self.capture.start(&mut self.backend, &self.config);
        self.finish_start(StreamKind::Capture, result)
    }

    /// Stop capturing. Returns `true` only if the device stop succeeded;
    /// device handles are released either way.
    pub fn stop_capture(&mut self) -> bool {
        let result = self.capture.stop();
        self.finish_stop(StreamKind::Capture, result)
    }

    /// Drain captured audio queued since the last call.
    ///
    /// Returns at most one scratch buffer's worth; the rest stays queued on
    /// the device for the next call.
    pub fn read_available(&mut self) -> Vec<u8> {
        let drain = self.capture.drain();

        self.diagnostics.packets_drained += drain.packets;
        self.diagnostics.bytes_captured += drain.data.len() as u64;
        if drain.deferred {
            self.diagnostics.deferred_drains += 1;
            log::trace!("capture drain deferred at {} bytes", drain.data.len());
        }
        if let Some(ref e) = drain.error {
            self.diagnostics.capture_errors += 1;
            self.report_error(StreamKind::Capture, e);
        }

        drain.data
    }

    /// Start playing to the default output device.
    pub fn start_render(&mut self) -> bool {
        let result = self.render.start(&mut self.backend, &self.config);
        self.finish_start(StreamKind::Render, result)
    }

    pub fn stop_render(&mut self) -> bool {
        let result = self.render.stop();
        self.finish_stop(StreamKind::Render, result)
    }

    /// Replace the playback source. `bytes` must start with the container
    /// header, which is discarded unread.
    pub fn set_source(&mut self, bytes: &[u8]) -> Result<(), BridgeError> {
        self.render.set_source(bytes).inspect_err(|e| {
            log::warn!("playback source rejected: {}", e);
        })
    }

    /// Feed the output device once. Returns whether it still has audio
    /// queued; `false` when render is idle or the tick failed.
    pub fn tick(&mut self) -> bool {
        if !self.render.state().is_active() {
            return false;
        }

        self.diagnostics.ticks += 1;
        match self.render.feed() {
            Ok(tick) => {
                match tick.commit {
                    Commit::Audio { frames } => {
                        self.diagnostics.bytes_rendered += self.config.format.frames_to_bytes(frames) as u64;
                    }
                    Commit::Silence => self.diagnostics.silent_commits += 1,
                }
                tick.is_playing()
            }
            Err(e) => {
                self.diagnostics.render_errors += 1;
                self.report_error(StreamKind::Render, &e);
                false
            }
        }
    }

    /// Skip playback forward by the configured number of seconds.
    /// Returns `false` if that would reach the end of the source.
    pub fn skip_forward(&mut self) -> bool {
        self.render.skip_forward()
    }

    fn finish_start(&self, kind: StreamKind, result: Result<(), BridgeError>) -> bool {
        match result {
            Ok(()) => {
                self.notify_state(kind, SessionState::Active);
                true
            }
            Err(BridgeError::AlreadyActive) => {
                log::debug!("{} already active, start ignored", kind);
                false
            }
            Err(e) => {
                log::error!("{} start failed: {}", kind, e);
                self.report_error(kind, &e);
                false
            }
        }
    }

    fn finish_stop(&self, kind: StreamKind, result: Result<(), BridgeError>) -> bool {
        match result {
            Ok(()) => {
                self.notify_state(kind, SessionState::Idle);
                true
            }
            Err(BridgeError::NotActive) => false,
            Err(e) => {
                self.notify_state(kind, SessionState::Idle);
                self.report_error(kind, &e);
                false
            }
        }
    }

    fn notify_state(&self, kind: StreamKind, state: SessionState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(kind, state);
        }
    }

    fn report_error(&self, kind: StreamKind, error: &BridgeError) {
        log::warn!("{}: {}", kind, error);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(kind, error);
        }
    }
}
