//! # audio-bridge-core
//!
//! Platform-agnostic core of a poll-driven audio capture/render bridge.
//!
//! Reconciles an audio engine's variable-size, frame-oriented packets with a
//! plain byte-buffer contract: capture is drained into a bounded scratch
//! buffer, and render is fed from a linear source buffer, falling back to
//! silence once it runs out. Platform backends (Windows WASAPI) implement
//! the `AudioBackend` trait and plug into the generic `AudioBridge`.
//!
//! ## Architecture
//!
//! ```text
//! audio-bridge-core (this crate)
//! ├── traits/       ← AudioBackend, CaptureEndpoint, RenderEndpoint, BridgeDelegate
//! ├── models/       ← StreamFormat, BridgeError, BridgeConfiguration, SessionState, etc.
//! ├── processing/   ← SourceBuffer, WAV header helpers
//! ├── session/      ← CaptureSession, RenderSession, AudioBridge, BridgeController, PollDriver
//! └── storage/      ← WavFileWriter, metadata sidecars, recording files
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::BridgeConfiguration;
pub use models::diagnostics::BridgeDiagnostics;
pub use models::error::BridgeError;
pub use models::format::StreamFormat;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::{ControllerMode, SessionState, StreamKind};
pub use processing::source_buffer::SourceBuffer;
pub use session::bridge::AudioBridge;
pub use session::capture::{CaptureSession, Drain};
pub use session::controller::BridgeController;
pub use session::driver::PollDriver;
pub use session::render::{Commit, RenderSession, Tick};
pub use storage::recordings::RecordingInfo;
pub use storage::wav_writer::WavFileWriter;
pub use traits::audio_backend::{AudioBackend, CaptureEndpoint, CapturePacket, RenderEndpoint};
pub use traits::bridge_delegate::BridgeDelegate;
