/// Counters for debugging capture and render sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeDiagnostics {
    pub packets_drained: u64,
    pub bytes_captured: u64,
    /// Drains that stopped early because the next packet would overflow scratch.
    pub deferred_drains: u64,
    pub capture_errors: u64,
    pub ticks: u64,
    pub bytes_rendered: u64,
    pub silent_commits: u64,
    pub render_errors: u64,
}
