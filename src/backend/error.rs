//! Backend error types

use std::time::Duration;
use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Http { status }, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Transport, message)
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            BackendErrorKind::Timeout { after },
            format!("Request timed out after {}s", after.as_secs()),
        )
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Malformed, message)
    }
}

/// Error classification
///
/// Non-2xx and transport failures are both opaque to callers; the split
/// exists for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Non-2xx response
    Http { status: u16 },
    /// Connection refused, reset, DNS failure
    Transport,
    /// No response within the configured timeout
    Timeout { after: Duration },
    /// 2xx response whose body could not be decoded
    Malformed,
}
