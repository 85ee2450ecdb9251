//! Upstream client error types.

use std::sync::Arc;

use courtside_core::{Error, ResourceKey};

/// Errors from a single upstream request.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status.
    #[error("HTTP error: {status}")]
    Status { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error (connect, TLS, reset).
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Body was not valid JSON.
    #[error("decode error: {0}")]
    Decode(String),

    /// The client could not be built or the request was malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl UpstreamError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// 429, 5xx, timeouts and connection-level failures are transient;
    /// other statuses and decode errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Status { status } => *status == 429 || (500..=599).contains(status),
            UpstreamError::Timeout | UpstreamError::Network(_) => true,
            UpstreamError::Decode(_) | UpstreamError::InvalidRequest(_) => false,
        }
    }

    /// Attach the resource key and convert into the crate-wide error.
    pub fn for_key(self, key: &ResourceKey) -> Error {
        Error::Upstream { key: key.to_string(), reason: self.to_string() }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if let Some(status) = err.status() {
            UpstreamError::Status { status: status.as_u16() }
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Network(Arc::new(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::ResourceClass;

    #[test]
    fn test_error_display() {
        let err = UpstreamError::Status { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = UpstreamError::Decode("expected value".to_string());
        assert!(err.to_string().contains("decode error"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(UpstreamError::Status { status: 429 }.is_transient());
        assert!(UpstreamError::Status { status: 500 }.is_transient());
        assert!(UpstreamError::Status { status: 504 }.is_transient());
        assert!(UpstreamError::Timeout.is_transient());
        assert!(!UpstreamError::Status { status: 404 }.is_transient());
        assert!(!UpstreamError::Status { status: 403 }.is_transient());
        assert!(!UpstreamError::Decode("bad".into()).is_transient());
    }

    #[test]
    fn test_for_key() {
        let key = ResourceKey::new(ResourceClass::LiveDetail, "0022400500");
        let err = UpstreamError::Status { status: 502 }.for_key(&key);
        assert!(matches!(&err, Error::Upstream { key, .. } if key == "box:0022400500"));
        assert!(err.to_string().contains("502"));
    }
}
