//! Error types for the remote API boundary
//!
//! Remote failures are recoverable: callers log them and fall back to a safe
//! default (unknown submittable state, stale preview, empty answer list).
//! Nothing here is retried automatically.

/// Remote operation errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a response (connection, DNS, timeout)
    #[error("transport failure: {0}")]
    Transport(String),

    /// Server responded outside the 2xx range; all non-2xx are treated
    /// uniformly as failure
    #[error("unexpected status {status}")]
    Status { status: u16 },

    /// Response body did not decode into the expected shape
    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether a user re-triggering the action could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status } => *status >= 500,
            Self::MalformedBody(_) => false,
        }
    }
}
