//! Unified error types for courtside.
//!
//! Every variant carries a stable code prefix so callers on the other side of
//! the MCP transport can branch on it without parsing free text.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the courtside gateway.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., a malformed date or game id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Every candidate version or retry path was exhausted.
    #[error("UPSTREAM_UNAVAILABLE: {0}")]
    UpstreamUnavailable(String),

    /// A single upstream resource failed after retries.
    #[error("UPSTREAM_ERROR: {key}: {reason}")]
    Upstream { key: String, reason: String },

    /// Batch input exceeds the configured ceiling.
    #[error("TOO_MANY_KEYS: {count} requested, at most {max} allowed")]
    TooManyKeys { count: usize, max: usize },

    /// A probed schedule version parsed but lacked the expected marker.
    #[error("MALFORMED_SCHEDULE: version {version}: {reason}")]
    MalformedSchedule { version: u32, reason: String },

    /// A value could not be canonicalized for fingerprinting.
    #[error("FINGERPRINT_FAILED: {0}")]
    Fingerprint(String),

    /// A deadline elapsed before the work completed.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// No cache entry found for the given key.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Unexpected internal failure (worker panic, closed semaphore).
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl Error {
    /// The stable code prefix of this error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Error::Upstream { .. } => "UPSTREAM_ERROR",
            Error::TooManyKeys { .. } => "TOO_MANY_KEYS",
            Error::MalformedSchedule { .. } => "MALFORMED_SCHEDULE",
            Error::Fingerprint(_) => "FINGERPRINT_FAILED",
            Error::Timeout(_) => "TIMEOUT",
            Error::CacheMiss(_) => "CACHE_MISS",
            Error::Internal(_) => "INTERNAL",
        }
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::TooManyKeys { .. } => -32602,
            Error::Upstream { .. } => -32008,
            Error::UpstreamUnavailable(_) => -32009,
            Error::Timeout(_) => -32006,
            Error::CacheMiss(_) => -32001,
            Error::MalformedSchedule { .. } | Error::Fingerprint(_) | Error::Internal(_) => -32603,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
