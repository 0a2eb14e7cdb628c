use thiserror::Error;

/// Errors that can occur while opening, driving, or recording an audio stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// No default endpoint exists for the requested direction.
    #[error("device not available")]
    DeviceNotAvailable,

    /// Activating or opening the device session failed.
    #[error("initialization failed: {0}")]
    InitializationFailed(String),

    #[error("session already active")]
    AlreadyActive,

    #[error("session not active")]
    NotActive,

    /// A mid-stream device call returned a failure code.
    #[error("device call failed: {0}")]
    DeviceCall(String),

    #[error("source of {len} bytes is shorter than the {header}-byte header")]
    InvalidSourceLength { len: usize, header: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
