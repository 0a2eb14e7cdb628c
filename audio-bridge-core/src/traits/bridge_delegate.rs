use crate::models::error::BridgeError;
use crate::models::state::{SessionState, StreamKind};

/// Event delegate for bridge notifications.
///
/// Methods are called on whichever thread polls the bridge.
/// Implementations should marshal to a UI thread if needed.
pub trait BridgeDelegate: Send + Sync {
    /// Called when a capture or render session starts or stops.
    fn on_state_changed(&self, kind: StreamKind, state: SessionState);

    /// Called when a start, stop, drain, or tick fails.
    fn on_error(&self, kind: StreamKind, error: &BridgeError);
}
