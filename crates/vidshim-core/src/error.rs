//! Error types for VidShim Core

use thiserror::Error;

/// Result type alias for shim operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shim error types
#[derive(Error, Debug)]
pub enum Error {
    // Metadata errors
    #[error("Invalid stream info: {0}")]
    InvalidStreamInfo(#[from] serde_json::Error),

    // Source errors
    #[error("Invalid source URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // Browser errors
    #[error("Capability query failed: {0}")]
    Capability(String),

    #[error("DOM operation failed: {0}")]
    Dom(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a capability query error
    pub fn capability(msg: impl Into<String>) -> Self {
        Error::Capability(msg.into())
    }

    /// Returns true if a retry with the same inputs can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Capability(_) | Error::Dom(_))
    }

    /// Returns the error code for host diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidStreamInfo(_) => "INVALID_STREAM_INFO",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Capability(_) => "CAPABILITY",
            Error::Dom(_) => "DOM",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::InvalidConfig("stale_pause_ms must be positive".to_string());
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(!err.is_recoverable());
        assert!(Error::capability("boom").is_recoverable());
    }
}
