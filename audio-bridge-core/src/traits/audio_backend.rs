use crate::models::config::BridgeConfiguration;
use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;

/// A captured packet borrowed from the device until it is released.
#[derive(Debug)]
pub struct CapturePacket<'a> {
    /// Raw PCM for `frames` frames.
    pub data: &'a [u8],
    pub frames: u32,
    /// The device flagged this packet as silence; `data` may be stale.
    pub silent: bool,
}

/// Platform audio engine that opens sessions on its default endpoints.
///
/// Implemented by:
/// - `WasapiBackend` (Windows)
/// - the simulated backend used by this crate's tests
pub trait AudioBackend: Send {
    type Capture: CaptureEndpoint;
    type Render: RenderEndpoint;

    /// Resolve the default capture endpoint and open a shared-mode session
    /// at `format`. The returned endpoint is initialized but not started.
    ///
    /// Every handle acquired before a failure must be released on return.
    fn open_capture(
        &mut self,
        format: &StreamFormat,
        config: &BridgeConfiguration,
    ) -> Result<Self::Capture, BridgeError>;

    /// Resolve the default render endpoint and open a shared-mode session
    /// at `format`. The returned endpoint is initialized but not started.
    fn open_render(
        &mut self,
        format: &StreamFormat,
        config: &BridgeConfiguration,
    ) -> Result<Self::Render, BridgeError>;
}

/// An opened capture session. Dropping it releases every device handle.
pub trait CaptureEndpoint: Send {
    fn start(&mut self) -> Result<(), BridgeError>;

    fn stop(&mut self) -> Result<(), BridgeError>;

    /// Frames in the next queued packet, 0 when nothing is queued.
    fn next_packet_frames(&mut self) -> Result<u32, BridgeError>;

    /// Borrow the next queued packet. Must be paired with `release_packet`.
    fn acquire_packet(&mut self) -> Result<CapturePacket<'_>, BridgeError>;

    /// Hand the packet back. Releasing 0 frames leaves it queued.
    fn release_packet(&mut self, frames: u32) -> Result<(), BridgeError>;
}

/// An opened render session. Dropping it releases every device handle.
pub trait RenderEndpoint: Send {
    fn start(&mut self) -> Result<(), BridgeError>;

    fn stop(&mut self) -> Result<(), BridgeError>;

    /// Total frame capacity of the device ring buffer.
    fn buffer_frames(&mut self) -> Result<u32, BridgeError>;

    /// Frames queued in the ring buffer and not yet played.
    fn padding_frames(&mut self) -> Result<u32, BridgeError>;

    /// Borrow a writable region of exactly `frames` frames.
    /// Must be paired with `release_region`.
    fn acquire_region(&mut self, frames: u32) -> Result<&mut [u8], BridgeError>;

    /// Commit `frames_written` frames of the acquired region. With `silent`
    /// set, the device plays silence for the region regardless of contents.
    fn release_region(&mut self, frames_written: u32, silent: bool) -> Result<(), BridgeError>;
}
