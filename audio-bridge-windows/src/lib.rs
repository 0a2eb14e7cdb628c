//! # audio-bridge-windows
//!
//! Windows WASAPI backend for audio-bridge.
//!
//! Provides:
//! - `WasapiBackend`: opens the default capture and render endpoints in shared mode
//! - `WasapiCaptureEndpoint` / `WasapiRenderEndpoint`: the opened device sessions
//!
//! ## Platform Requirements
//! - Windows 8+ (IAudioClient2 stream categories)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use audio_bridge_core::{AudioBridge, BridgeController, PollDriver};
//! use audio_bridge_windows::WasapiBackend;
//!
//! let bridge = AudioBridge::with_defaults(WasapiBackend::new()?);
//! let controller = Arc::new(Mutex::new(BridgeController::new(bridge)));
//! let driver = PollDriver::spawn(Arc::clone(&controller), Duration::from_millis(33))?;
//! controller.lock().start_recording()?;
//! ```

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod wasapi_backend;
#[cfg(target_os = "windows")]
pub mod wasapi_capture;
#[cfg(target_os = "windows")]
pub mod wasapi_render;

#[cfg(target_os = "windows")]
pub use wasapi_backend::WasapiBackend;
#[cfg(target_os = "windows")]
pub use wasapi_capture::WasapiCaptureEndpoint;
#[cfg(target_os = "windows")]
pub use wasapi_render::WasapiRenderEndpoint;
