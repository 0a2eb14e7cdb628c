//! WASAPI render endpoint.

use windows::Win32::Media::Audio::*;

use audio_bridge_core::models::error::BridgeError;
use audio_bridge_core::models::format::StreamFormat;
use audio_bridge_core::traits::audio_backend::RenderEndpoint;

/// An initialized shared-mode render client on the default speakers.
pub struct WasapiRenderEndpoint {
    client: IAudioClient2,
    render_client: IAudioRenderClient,
    frame_size: usize,
}

// SAFETY: same as the capture endpoint; MTA interfaces reached only through `&mut self`.
unsafe impl Send for WasapiRenderEndpoint {}

impl WasapiRenderEndpoint {
    pub(crate) fn new(client: IAudioClient2, render_client: IAudioRenderClient, format: &StreamFormat) -> Self {
        Self {
            client,
            render_client,
            frame_size: format.frame_size_bytes() as usize,
        }
    }
}

impl RenderEndpoint for WasapiRenderEndpoint {
    fn start(&mut self) -> Result<(), BridgeError> {
        unsafe { self.client.Start() }.map_err(|e| BridgeError::DeviceCall(format!("render Start failed: {}", e)))
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        unsafe { self.client.Stop() }.map_err(|e| BridgeError::DeviceCall(format!("render Stop failed: {}", e)))
    }

    fn buffer_frames(&mut self) -> Result<u32, BridgeError> {
        unsafe { self.client.GetBufferSize() }
            .map_err(|e| BridgeError::DeviceCall(format!("GetBufferSize failed: {}", e)))
    }

    fn padding_frames(&mut self) -> Result<u32, BridgeError> {
        unsafe { self.client.GetCurrentPadding() }
            .map_err(|e| BridgeError::DeviceCall(format!("GetCurrentPadding failed: {}", e)))
    }

    fn acquire_region(&mut self, frames: u32) -> Result<&mut [u8], BridgeError> {
        let data = unsafe { self.render_client.GetBuffer(frames) }
            .map_err(|e| BridgeError::DeviceCall(format!("render GetBuffer failed: {}", e)))?;

        let len = frames as usize * self.frame_size;
        if data.is_null() || len == 0 {
            return Ok(&mut []);
        }
        // SAFETY: the engine hands out `frames` writable frames at `data` until
        // ReleaseBuffer, and the borrow on `self` outlives the slice.
        Ok(unsafe { std::slice::from_raw_parts_mut(data, len) })
    }

    fn release_region(&mut self, frames_written: u32, silent: bool) -> Result<(), BridgeError> {
        let flags = if silent { AUDCLNT_BUFFERFLAGS_SILENT.0 as u32 } else { 0 };
        unsafe { self.render_client.ReleaseBuffer(frames_written, flags) }
            .map_err(|e| BridgeError::DeviceCall(format!("render ReleaseBuffer failed: {}", e)))
    }
}
