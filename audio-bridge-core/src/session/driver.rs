use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::BridgeError;
use crate::session::controller::BridgeController;
use crate::traits::audio_backend::AudioBackend;

/// Background timer that polls a shared [`BridgeController`].
///
/// Every poll goes through the controller's mutex, so drains, ticks, and
/// caller commands on the same controller never overlap.
pub struct PollDriver {
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PollDriver {
    pub fn spawn<B>(controller: Arc<Mutex<BridgeController<B>>>, interval: Duration) -> Result<Self, BridgeError>
    where
        B: AudioBackend + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = thread::Builder::new()
            .name("audio-bridge-poll".into())
            .spawn(move || {
                while flag.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    controller.lock().poll();
                }
            })
            .map_err(|e| BridgeError::InitializationFailed(format!("failed to spawn poll thread: {}", e)))?;

        log::debug!("poll driver started ({} ms)", interval.as_millis());
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop polling and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("poll driver thread panicked");
            }
        }
    }
}

impl Drop for PollDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
