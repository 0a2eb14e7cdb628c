//! Simulated audio engine for unit tests.
//!
//! Capture packets are queued by the test; render commits are recorded and
//! the simulated hardware plays `drain_per_tick` frames every time the ring
//! buffer capacity is queried (once at the top of each feeder tick).

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::BridgeConfiguration;
use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;
use crate::traits::audio_backend::{AudioBackend, CaptureEndpoint, CapturePacket, RenderEndpoint};

#[derive(Debug, Default)]
pub(crate) struct SimState {
    pub capture_opens: usize,
    pub render_opens: usize,
    pub capture_endpoints_live: usize,
    pub render_endpoints_live: usize,
    pub capture_running: bool,
    pub render_running: bool,

    pub missing_device: bool,
    pub fail_start: bool,
    pub fail_stop: bool,

    /// Queued capture packets, raw bytes.
    pub packets: VecDeque<Vec<u8>>,
    pub fail_acquire_packet_at: Option<usize>,
    pub packets_acquired: usize,
    /// Flag every acquired packet as silent.
    pub silent_packets: bool,
    /// Hand out half the bytes the packet's frame count promises.
    pub short_packet_data: bool,

    pub buffer_frames: u32,
    pub padding: u32,
    pub drain_per_tick: u32,
    pub fail_padding: bool,
    pub fail_acquire_region: bool,
    pub rendered: Vec<u8>,
    /// `(frames_written, silent)` for every committed region.
    pub commits: Vec<(u32, bool)>,
}

impl SimState {
    pub fn silent_commits(&self) -> usize {
        self.commits.iter().filter(|(_, silent)| *silent).count()
    }
}

pub(crate) struct SimulatedBackend {
    pub state: Arc<Mutex<SimState>>,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                buffer_frames: 8,
                ..Default::default()
            })),
        }
    }

    pub fn handle(&self) -> Arc<Mutex<SimState>> {
        Arc::clone(&self.state)
    }
}

impl AudioBackend for SimulatedBackend {
    type Capture = SimulatedCapture;
    type Render = SimulatedRender;

    fn open_capture(
        &mut self,
        format: &StreamFormat,
        _config: &BridgeConfiguration,
    ) -> Result<SimulatedCapture, BridgeError> {
        let mut s = self.state.lock();
        if s.missing_device {
            return Err(BridgeError::DeviceNotAvailable);
        }
        s.capture_opens += 1;
        s.capture_endpoints_live += 1;
        Ok(SimulatedCapture {
            state: Arc::clone(&self.state),
            frame_size: format.frame_size_bytes() as usize,
            packet: Vec::new(),
            frames: 0,
            silent: false,
        })
    }

    fn open_render(
        &mut self,
        format: &StreamFormat,
        _config: &BridgeConfiguration,
    ) -> Result<SimulatedRender, BridgeError> {
        let mut s = self.state.lock();
        if s.missing_device {
            return Err(BridgeError::DeviceNotAvailable);
        }
        s.render_opens += 1;
        s.render_endpoints_live += 1;
        Ok(SimulatedRender {
            state: Arc::clone(&self.state),
            frame_size: format.frame_size_bytes() as usize,
            region: Vec::new(),
        })
    }
}

pub(crate) struct SimulatedCapture {
    state: Arc<Mutex<SimState>>,
    frame_size: usize,
    packet: Vec<u8>,
    frames: u32,
    silent: bool,
}

impl CaptureEndpoint for SimulatedCapture {
    fn start(&mut self) -> Result<(), BridgeError> {
        let mut s = self.state.lock();
        if s.fail_start {
            return Err(BridgeError::InitializationFailed("Start failed".into()));
        }
        s.capture_running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        let mut s = self.state.lock();
        s.capture_running = false;
        if s.fail_stop {
            return Err(BridgeError::DeviceCall("Stop failed".into()));
        }
        Ok(())
    }

    fn next_packet_frames(&mut self) -> Result<u32, BridgeError> {
        let s = self.state.lock();
        Ok(s.packets.front().map_or(0, |p| (p.len() / self.frame_size) as u32))
    }

    fn acquire_packet(&mut self) -> Result<CapturePacket<'_>, BridgeError> {
        {
            let mut s = self.state.lock();
            if s.fail_acquire_packet_at == Some(s.packets_acquired) {
                return Err(BridgeError::DeviceCall("GetBuffer failed".into()));
            }
            s.packets_acquired += 1;
            self.packet = s
                .packets
                .front()
                .cloned()
                .ok_or_else(|| BridgeError::DeviceCall("no packet queued".into()))?;
            self.silent = s.silent_packets;
            self.frames = (self.packet.len() / self.frame_size) as u32;
            if s.short_packet_data {
                self.packet.truncate(self.packet.len() / 2);
            }
        }
        Ok(CapturePacket {
            frames: self.frames,
            data: &self.packet,
            silent: self.silent,
        })
    }

    fn release_packet(&mut self, frames: u32) -> Result<(), BridgeError> {
        if frames > 0 {
            self.state.lock().packets.pop_front();
        }
        Ok(())
    }
}

impl Drop for SimulatedCapture {
    fn drop(&mut self) {
        self.state.lock().capture_endpoints_live -= 1;
    }
}

pub(crate) struct SimulatedRender {
    state: Arc<Mutex<SimState>>,
    frame_size: usize,
    region: Vec<u8>,
}

impl RenderEndpoint for SimulatedRender {
    fn start(&mut self) -> Result<(), BridgeError> {
        let mut s = self.state.lock();
        if s.fail_start {
            return Err(BridgeError::InitializationFailed("Start failed".into()));
        }
        s.render_running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        let mut s = self.state.lock();
        s.render_running = false;
        if s.fail_stop {
            return Err(BridgeError::DeviceCall("Stop failed".into()));
        }
        Ok(())
    }

    fn buffer_frames(&mut self) -> Result<u32, BridgeError> {
        let mut s = self.state.lock();
        s.padding = s.padding.saturating_sub(s.drain_per_tick);
        Ok(s.buffer_frames)
    }

    fn padding_frames(&mut self) -> Result<u32, BridgeError> {
        let s = self.state.lock();
        if s.fail_padding {
            return Err(BridgeError::DeviceCall("GetCurrentPadding failed".into()));
        }
        Ok(s.padding)
    }

    fn acquire_region(&mut self, frames: u32) -> Result<&mut [u8], BridgeError> {
        {
            let s = self.state.lock();
            if s.fail_acquire_region || frames > s.buffer_frames - s.padding {
                return Err(BridgeError::DeviceCall("GetBuffer failed".into()));
            }
        }
        self.region = vec![0xEE; frames as usize * self.frame_size];
        Ok(&mut self.region)
    }

    fn release_region(&mut self, frames_written: u32, silent: bool) -> Result<(), BridgeError> {
        let mut s = self.state.lock();
        if !silent {
            let bytes = frames_written as usize * self.frame_size;
            s.rendered.extend_from_slice(&self.region[..bytes]);
        }
        s.padding += frames_written;
        s.commits.push((frames_written, silent));
        Ok(())
    }
}

impl Drop for SimulatedRender {
    fn drop(&mut self) {
        self.state.lock().render_endpoints_live -= 1;
    }
}

/// `count` bytes of a recognizable ramp.
pub(crate) fn ramp(count: usize) -> Vec<u8> {
    (0..count).map(|i| (i % 251) as u8).collect()
}
