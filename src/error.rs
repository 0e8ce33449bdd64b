//! Error types for the playout adapter.

use thiserror::Error;

/// Errors surfaced by device queries and stream binding.
///
/// Host failures carry the name of the failing host operation so log lines
/// and error values identify the exact call that went wrong.
#[derive(Debug, Clone, Error)]
pub enum PlayoutError {
    /// No device with the given identifier exists on the host
    #[error("audio output device not found: {device_id}")]
    DeviceNotFound { device_id: String },

    /// A host audio API call failed
    #[error("host audio operation {operation} failed: {message}")]
    HostOperationFailed { operation: String, message: String },

    /// The output stream is no longer controllable
    #[error("output stream error: {message}")]
    StreamError { message: String },

    /// Invalid or unusable configuration
    #[error("audio configuration error: {message}")]
    ConfigurationError { message: String },
}

impl PlayoutError {
    /// Shorthand for a failed host operation.
    pub fn host(operation: &str, message: impl ToString) -> Self {
        Self::HostOperationFailed {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type for playout operations.
pub type PlayoutResult<T> = std::result::Result<T, PlayoutError>;
