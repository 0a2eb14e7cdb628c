//! WASAPI implementation of the audio device collaborator.
//!
//! Opens the default capture or render endpoint in shared mode with a fixed
//! PCM format. The audio engine converts to and from the device mix format.

use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;

use audio_bridge_core::models::config::BridgeConfiguration;
use audio_bridge_core::models::error::BridgeError;
use audio_bridge_core::models::format::StreamFormat;
use audio_bridge_core::traits::audio_backend::AudioBackend;

use crate::com::{ComGuard, CoTaskMem};
use crate::wasapi_capture::WasapiCaptureEndpoint;
use crate::wasapi_render::WasapiRenderEndpoint;

/// Stream flags asking the engine to convert our PCM format to the mix format.
const STREAM_FLAGS: u32 = AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM | AUDCLNT_STREAMFLAGS_SRC_DEFAULT_QUALITY;

/// WASAPI audio engine on the default console endpoints.
///
/// Keeps COM initialized for as long as the backend lives. Endpoints it
/// opens must be dropped before it.
pub struct WasapiBackend {
    enumerator: IMMDeviceEnumerator,
    _com: ComGuard,
}

// SAFETY: COM is initialized multithreaded; MTA interface pointers may be
// called from any thread while the apartment is alive. The bridge serializes
// all calls through `&mut self`.
unsafe impl Send for WasapiBackend {}

impl WasapiBackend {
    pub fn new() -> Result<Self, BridgeError> {
        let com = ComGuard::init_multithreaded()?;
        let enumerator: IMMDeviceEnumerator = unsafe {
            CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                .map_err(|e| BridgeError::InitializationFailed(format!("failed to create enumerator: {}", e)))?
        };
        Ok(Self { enumerator, _com: com })
    }

    /// Resolve the default endpoint for `data_flow` and open an initialized
    /// (not started) shared-mode client at `format`.
    ///
    /// Sequence:
    /// 1. Default endpoint (console role)
    /// 2. Activate IAudioClient2
    /// 3. Read the mix format (logged, then freed)
    /// 4. Stream category "Other", the only one legal for capture
    /// 5. Initialize shared mode with the negotiated PCM format
    fn open_client(
        &self,
        data_flow: EDataFlow,
        format: &StreamFormat,
        config: &BridgeConfiguration,
    ) -> Result<IAudioClient2, BridgeError> {
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(data_flow, eConsole)
                .map_err(|_| BridgeError::DeviceNotAvailable)?;

            let client: IAudioClient2 = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| BridgeError::InitializationFailed(format!("Activate failed: {}", e)))?;

            let mix_format = CoTaskMem::from_raw(
                client
                    .GetMixFormat()
                    .map_err(|e| BridgeError::InitializationFailed(format!("GetMixFormat failed: {}", e)))?,
            );
            if let Some(mix) = mix_format.get() {
                let (channels, rate, bits) = (mix.nChannels, mix.nSamplesPerSec, mix.wBitsPerSample);
                log::debug!("device mix format: {} ch, {} Hz, {} bit", channels, rate, bits);
            }
            drop(mix_format);

            let properties = AudioClientProperties {
                cbSize: std::mem::size_of::<AudioClientProperties>() as u32,
                eCategory: AudioCategory_Other,
                ..Default::default()
            };
            client
                .SetClientProperties(&properties)
                .map_err(|e| BridgeError::InitializationFailed(format!("SetClientProperties failed: {}", e)))?;

            let wave_format = pcm_wave_format(format);
            client
                .Initialize(
                    AUDCLNT_SHAREMODE_SHARED,
                    STREAM_FLAGS,
                    config.buffer_duration_hns(),
                    0,
                    &wave_format,
                    None,
                )
                .map_err(|e| BridgeError::InitializationFailed(format!("IAudioClient::Initialize failed: {}", e)))?;

            Ok(client)
        }
    }
}

impl AudioBackend for WasapiBackend {
    type Capture = WasapiCaptureEndpoint;
    type Render = WasapiRenderEndpoint;

    fn open_capture(
        &mut self,
        format: &StreamFormat,
        config: &BridgeConfiguration,
    ) -> Result<WasapiCaptureEndpoint, BridgeError> {
        let client = self.open_client(eCapture, format, config)?;
        let capture_client: IAudioCaptureClient = unsafe {
            client
                .GetService()
                .map_err(|e| BridgeError::InitializationFailed(format!("GetService failed: {}", e)))?
        };
        Ok(WasapiCaptureEndpoint::new(client, capture_client, format))
    }

    fn open_render(
        &mut self,
        format: &StreamFormat,
        config: &BridgeConfiguration,
    ) -> Result<WasapiRenderEndpoint, BridgeError> {
        let client = self.open_client(eRender, format, config)?;
        let render_client: IAudioRenderClient = unsafe {
            client
                .GetService()
                .map_err(|e| BridgeError::InitializationFailed(format!("GetService failed: {}", e)))?
        };
        Ok(WasapiRenderEndpoint::new(client, render_client, format))
    }
}

/// `WAVEFORMATEX` for plain integer PCM at `format`.
fn pcm_wave_format(format: &StreamFormat) -> WAVEFORMATEX {
    WAVEFORMATEX {
        wFormatTag: WAVE_FORMAT_PCM as u16,
        nChannels: format.channel_count(),
        nSamplesPerSec: format.sample_rate(),
        nAvgBytesPerSec: format.avg_bytes_per_sec(),
        nBlockAlign: format.frame_size_bytes() as u16,
        wBitsPerSample: format.bits_per_sample(),
        cbSize: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_format_matches_stream_format() {
        let wf = pcm_wave_format(&StreamFormat::default());
        let (tag, channels, rate, avg, align, bits, extra) = (
            wf.wFormatTag,
            wf.nChannels,
            wf.nSamplesPerSec,
            wf.nAvgBytesPerSec,
            wf.nBlockAlign,
            wf.wBitsPerSample,
            wf.cbSize,
        );
        assert_eq!(tag, 1);
        assert_eq!(channels, 2);
        assert_eq!(rate, 44_100);
        assert_eq!(avg, 176_400);
        assert_eq!(align, 4);
        assert_eq!(bits, 16);
        assert_eq!(extra, 0);
    }
}
