use crate::models::config::BridgeConfiguration;
use crate::models::error::BridgeError;
use crate::models::format::StreamFormat;
use crate::models::state::SessionState;
use crate::traits::audio_backend::{AudioBackend, CaptureEndpoint};

/// Result of one drain pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drain {
    /// Captured bytes, sized exactly to what was copied.
    pub data: Vec<u8>,
    pub packets: u64,
    /// Packets were left queued because scratch capacity would be exceeded.
    pub deferred: bool,
    /// Device failure that ended the pass early. `data` still holds what was
    /// copied before it.
    pub error: Option<BridgeError>,
}

/// Capture session: owns the opened endpoint while active.
///
/// State transitions:
/// ```text
/// idle --start--> active --stop--> idle
/// ```
pub struct CaptureSession<E: CaptureEndpoint> {
    endpoint: Option<E>,
    format: StreamFormat,
    scratch_capacity: usize,
}

impl<E: CaptureEndpoint> CaptureSession<E> {
    pub fn new(config: &BridgeConfiguration) -> Self {
        Self {
            endpoint: None,
            format: config.format,
            scratch_capacity: config.scratch_capacity,
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

    /// Open the default capture endpoint and start streaming.
    ///
    /// On failure the session stays idle; the endpoint, if it was opened,
    /// is dropped before returning, which releases its device handles.
    pub fn start<B>(&mut self, backend: &mut B, config: &BridgeConfiguration) -> Result<(), BridgeError>
    where
        B: AudioBackend<Capture = E>,
    {
        if self.endpoint.is_some() {
            return Err(BridgeError::AlreadyActive);
        }

        let mut endpoint = backend.open_capture(&self.format, config)?;
        endpoint.start()?;

        log::info!(
            "capture started: {} ch, {} Hz, {} bit",
            self.format.channel_count(),
            self.format.sample_rate(),
            self.format.bits_per_sample()
        );
        self.endpoint = Some(endpoint);
        Ok(())
    }

    /// Stop streaming and release the endpoint.
    ///
    /// The endpoint is released and the session returns to idle even when
    /// the device's stop call fails; that failure is still returned.
    pub fn stop(&mut self) -> Result<(), BridgeError> {
        let mut endpoint = self.endpoint.take().ok_or(BridgeError::NotActive)?;
        let result = endpoint.stop();
        drop(endpoint);

        match &result {
            Ok(()) => log::info!("capture stopped"),
            Err(e) => log::warn!("capture stop failed, handles released anyway: {}", e),
        }
        result
    }

    /// Drain every queued packet that fits in one scratch buffer.
    ///
    /// Returns an empty drain when the session is idle.
    pub fn drain(&mut self) -> Drain {
        let Some(endpoint) = self.endpoint.as_mut() else {
            return Drain::default();
        };

        let frame_size = self.format.frame_size_bytes() as usize;
        let capacity = self.scratch_capacity;
        let mut scratch: Vec<u8> = Vec::with_capacity(capacity);
        let mut drain = Drain::default();

        let outcome = drain_into(endpoint, &mut scratch, capacity, frame_size, &mut drain);
        if let Err(e) = outcome {
            log::warn!("capture drain aborted after {} bytes: {}", scratch.len(), e);
            drain.error = Some(e);
        }

        scratch.shrink_to_fit();
        drain.data = scratch;
        drain
    }
}

fn drain_into<E: CaptureEndpoint>(
    endpoint: &mut E,
    scratch: &mut Vec<u8>,
    capacity: usize,
    frame_size: usize,
    drain: &mut Drain,
) -> Result<(), BridgeError> {
    let mut packet_frames = endpoint.next_packet_frames()?;

    while packet_frames > 0 {
        if scratch.len() + packet_frames as usize * frame_size > capacity {
            drain.deferred = true;
            break;
        }

        let packet = endpoint.acquire_packet()?;
        let frames = packet.frames;
        let bytes = frames as usize * frame_size;

        if scratch.len() + bytes > capacity {
            // Leave the packet queued for the next pass.
            drop(packet);
            endpoint.release_packet(0)?;
            drain.deferred = true;
            break;
        }

        if !packet.silent && packet.data.len() < bytes {
            let got = packet.data.len();
            drop(packet);
            endpoint.release_packet(frames)?;
            return Err(BridgeError::DeviceCall(format!(
                "packet of {} frames carried {} of {} bytes",
                frames, got, bytes
            )));
        }

        if packet.silent {
            scratch.resize(scratch.len() + bytes, 0);
        } else {
            scratch.extend_from_slice(&packet.data[..bytes]);
        }
        drop(packet);

        endpoint.release_packet(frames)?;
        drain.packets += 1;
        packet_frames = endpoint.next_packet_frames()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::DEFAULT_SCRATCH_CAPACITY;
    use crate::testing::{ramp, SimulatedBackend, SimulatedCapture};

    fn started() -> (CaptureSession<SimulatedCapture>, SimulatedBackend) {
        let config = BridgeConfiguration::default();
        let mut backend = SimulatedBackend::new();
        let mut session = CaptureSession::new(&config);
        session.start(&mut backend, &config).unwrap();
        (session, backend)
    }

    #[test]
    fn idle_session_drains_nothing() {
        let config = BridgeConfiguration::default();
        let mut session: CaptureSession<SimulatedCapture> = CaptureSession::new(&config);
        assert_eq!(session.drain(), Drain::default());
    }

    #[test]
    fn drains_all_queued_packets_in_order() {
        let (mut session, backend) = started();
        let first = ramp(400);
        let second = vec![7u8; 80];
        {
            let mut s = backend.state.lock();
            s.packets.push_back(first.clone());
            s.packets.push_back(second.clone());
        }

        let drain = session.drain();
        assert_eq!(drain.packets, 2);
        assert!(!drain.deferred);
        assert!(drain.error.is_none());
        assert_eq!(drain.data.len(), 480);
        assert_eq!(&drain.data[..400], &first[..]);
        assert_eq!(&drain.data[400..], &second[..]);
        assert!(backend.state.lock().packets.is_empty());
    }

    #[test]
    fn nothing_queued_returns_zero_bytes() {
        let (mut session, _backend) = started();
        let drain = session.drain();
        assert!(drain.data.is_empty());
        assert_eq!(drain.packets, 0);
    }

    #[test]
    fn capacity_guard_leaves_excess_queued() {
        let (mut session, backend) = started();
        // 10 packets of 40000 bytes = 400000 bytes, well above 128 KiB.
        for _ in 0..10 {
            backend.state.lock().packets.push_back(vec![1u8; 40_000]);
        }

        let drain = session.drain();
        assert!(drain.deferred);
        assert_eq!(drain.data.len(), 120_000);
        assert!(drain.data.len() < DEFAULT_SCRATCH_CAPACITY);
        assert_eq!(backend.state.lock().packets.len(), 7);

        // Next poll picks up where this one stopped.
        let next = session.drain();
        assert_eq!(next.data.len(), 120_000);
        assert_eq!(backend.state.lock().packets.len(), 4);
    }

    #[test]
    fn packet_filling_scratch_exactly_is_accepted() {
        let (mut session, backend) = started();
        backend.state.lock().packets.push_back(vec![3u8; DEFAULT_SCRATCH_CAPACITY]);

        let drain = session.drain();
        assert_eq!(drain.data.len(), DEFAULT_SCRATCH_CAPACITY);
        assert!(!drain.deferred);
    }

    #[test]
    fn device_failure_keeps_partial_data() {
        let (mut session, backend) = started();
        {
            let mut s = backend.state.lock();
            s.packets.push_back(vec![1u8; 16]);
            s.packets.push_back(vec![2u8; 16]);
            s.fail_acquire_packet_at = Some(1);
        }

        let drain = session.drain();
        assert_eq!(drain.data, vec![1u8; 16]);
        assert!(matches!(drain.error, Some(BridgeError::DeviceCall(_))));
        assert!(session.state().is_active());

        // The failure is not sticky; the next pass drains the rest.
        backend.state.lock().fail_acquire_packet_at = None;
        assert_eq!(session.drain().data, vec![2u8; 16]);
    }

    #[test]
    fn silent_packets_are_zero_filled() {
        let (mut session, backend) = started();
        {
            let mut s = backend.state.lock();
            s.silent_packets = true;
            s.packets.push_back(vec![0xFF; 16]);
            s.packets.push_back(vec![0xFF; 16]);
        }

        let drain = session.drain();
        assert_eq!(drain.packets, 2);
        assert_eq!(drain.data, vec![0u8; 32]);
        assert!(backend.state.lock().packets.is_empty());
    }

    #[test]
    fn short_packet_data_is_a_device_error() {
        let (mut session, backend) = started();
        {
            let mut s = backend.state.lock();
            s.packets.push_back(vec![4u8; 16]);
            s.packets.push_back(vec![5u8; 16]);
            s.short_packet_data = true;
        }

        let drain = session.drain();
        assert!(drain.data.is_empty());
        assert!(!drain.deferred);
        assert!(matches!(drain.error, Some(BridgeError::DeviceCall(_))));
        // The malformed packet is consumed so capture moves on.
        assert_eq!(backend.state.lock().packets.len(), 1);

        backend.state.lock().short_packet_data = false;
        let next = session.drain();
        assert!(next.error.is_none());
        assert_eq!(next.data, vec![5u8; 16]);
    }

    #[test]
    fn start_twice_does_not_reopen_device() {
        let config = BridgeConfiguration::default();
        let (mut session, mut backend) = started();
        assert_eq!(session.start(&mut backend, &config), Err(BridgeError::AlreadyActive));
        assert_eq!(backend.state.lock().capture_opens, 1);
    }

    #[test]
    fn failed_start_releases_endpoint() {
        let config = BridgeConfiguration::default();
        let mut backend = SimulatedBackend::new();
        backend.state.lock().fail_start = true;
        let mut session: CaptureSession<SimulatedCapture> = CaptureSession::new(&config);

        assert!(session.start(&mut backend, &config).is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(backend.state.lock().capture_endpoints_live, 0);
    }

    #[test]
    fn missing_device_fails_start() {
        let config = BridgeConfiguration::default();
        let mut backend = SimulatedBackend::new();
        backend.state.lock().missing_device = true;
        let mut session: CaptureSession<SimulatedCapture> = CaptureSession::new(&config);

        assert_eq!(session.start(&mut backend, &config), Err(BridgeError::DeviceNotAvailable));
    }

    #[test]
    fn stop_twice_releases_once() {
        let (mut session, backend) = started();
        assert!(session.stop().is_ok());
        assert_eq!(backend.state.lock().capture_endpoints_live, 0);
        assert_eq!(session.stop(), Err(BridgeError::NotActive));
    }

    #[test]
    fn failed_stop_still_releases() {
        let (mut session, backend) = started();
        backend.state.lock().fail_stop = true;
        assert!(session.stop().is_err());
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(backend.state.lock().capture_endpoints_live, 0);
    }
}
