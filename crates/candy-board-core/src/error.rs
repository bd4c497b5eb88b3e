//! Error types for the CANDY Board Service client core.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Wire protocol errors (framing and payload).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Failed to encode request: {0}")]
    Encoding(String),

    #[error("Short read on {part}: expected {expected} bytes, got {received}")]
    Framing {
        part: &'static str,
        expected: usize,
        received: usize,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Response frame of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while exchanging a frame with the daemon.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Service is not available at {}", path.display())]
    ServiceUnavailable { path: PathBuf },

    #[error("Permission denied on {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("No response from the service within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl TransportError {
    /// The OS error carried by this failure, if any.
    pub fn os_error(&self) -> Option<&std::io::Error> {
        match self {
            TransportError::Io(e) => Some(e),
            TransportError::Protocol(ProtocolError::Io(e)) => Some(e),
            _ => None,
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, TransportError>;
