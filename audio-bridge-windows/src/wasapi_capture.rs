//! WASAPI capture endpoint.

use windows::Win32::Media::Audio::*;

use audio_bridge_core::models::error::BridgeError;
use audio_bridge_core::models::format::StreamFormat;
use audio_bridge_core::traits::audio_backend::{CaptureEndpoint, CapturePacket};

/// An initialized shared-mode capture client on the default microphone.
///
/// Both interfaces are released when this is dropped.
pub struct WasapiCaptureEndpoint {
    client: IAudioClient2,
    capture_client: IAudioCaptureClient,
    frame_size: usize,
}

// SAFETY: the interfaces live in the multithreaded apartment and are only
// reached through `&mut self`, so calls never overlap.
unsafe impl Send for WasapiCaptureEndpoint {}

impl WasapiCaptureEndpoint {
    pub(crate) fn new(client: IAudioClient2, capture_client: IAudioCaptureClient, format: &StreamFormat) -> Self {
        Self {
            client,
            capture_client,
            frame_size: format.frame_size_bytes() as usize,
        }
    }
}

impl CaptureEndpoint for WasapiCaptureEndpoint {
    fn start(&mut self) -> Result<(), BridgeError> {
        unsafe { self.client.Start() }.map_err(|e| BridgeError::DeviceCall(format!("capture Start failed: {}", e)))
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        unsafe { self.client.Stop() }.map_err(|e| BridgeError::DeviceCall(format!("capture Stop failed: {}", e)))
    }

    fn next_packet_frames(&mut self) -> Result<u32, BridgeError> {
        unsafe { self.capture_client.GetNextPacketSize() }
            .map_err(|e| BridgeError::DeviceCall(format!("GetNextPacketSize failed: {}", e)))
    }

    fn acquire_packet(&mut self) -> Result<CapturePacket<'_>, BridgeError> {
        let mut data: *mut u8 = std::ptr::null_mut();
        let mut frames: u32 = 0;
        let mut flags: u32 = 0;

        unsafe {
            self.capture_client
                .GetBuffer(&mut data, &mut frames, &mut flags, None, None)
                .map_err(|e| BridgeError::DeviceCall(format!("capture GetBuffer failed: {}", e)))?;
        }

        let silent = flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0;
        let len = frames as usize * self.frame_size;
        let data = if data.is_null() || len == 0 {
            &[][..]
        } else {
            // SAFETY: the engine guarantees `frames` frames at `data` until ReleaseBuffer,
            // and the borrow on `self` outlives the slice.
            unsafe { std::slice::from_raw_parts(data, len) }
        };

        Ok(CapturePacket { data, frames, silent })
    }

    fn release_packet(&mut self, frames: u32) -> Result<(), BridgeError> {
        unsafe { self.capture_client.ReleaseBuffer(frames) }
            .map_err(|e| BridgeError::DeviceCall(format!("capture ReleaseBuffer failed: {}", e)))
    }
}
