use thiserror::Error;

/// Errors from chain access over the rotating endpoint pool.
///
/// All payloads are owned strings so the error can fan out to every waiter
/// of a deduplicated generation via a cheap clone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChainError {
    /// Request exceeded the configured timeout duration.
    #[error("Request timeout")]
    Timeout,

    /// Failed to establish a connection to the endpoint.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// HTTP-level error (non-2xx status code).
    #[error("HTTP error {0}: {1}")]
    Http(u16, String),

    /// JSON-RPC error returned by the endpoint.
    #[error("RPC error {0}: {1}")]
    Rpc(i64, String),

    /// Response could not be parsed or had an unexpected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Every endpoint in the rotation was tried and none produced a usable
    /// answer.
    #[error("Chain unavailable: all {attempted} endpoints exhausted")]
    Unavailable { attempted: usize },
}

impl ChainError {
    /// Returns `true` if this is a contract execution revert.
    ///
    /// A revert from `ownerOf` is a definitive answer ("not minted"), never
    /// a reason to try another endpoint.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        match self {
            Self::Rpc(_, message) => {
                let message_lower = message.to_lowercase();
                message_lower.contains("execution reverted") ||
                    message_lower.contains("revert") ||
                    message_lower.contains("invalid opcode")
            }
            _ => false,
        }
    }

    /// Returns `true` if the same request may succeed on another endpoint.
    ///
    /// Transient errors include timeouts, connection failures, HTTP 5xx and
    /// 429, and JSON-RPC server errors. Reverts and malformed responses are
    /// not transient: the former is an answer, the latter will not improve
    /// with retries against the same contract state.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::ConnectionFailed(_) => true,
            Self::Http(status, _) => (500..=599).contains(status) || *status == 429,
            Self::Rpc(code, _) => {
                if self.is_revert() {
                    return false;
                }
                // -32005 is rate limiting; -32603 and the -32000..-32099
                // server range are endpoint-side failures.
                matches!(code, -32099..=-32000 | -32603 | -32005)
            }
            Self::InvalidResponse(_) | Self::Unavailable { .. } => false,
        }
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Http(status.as_u16(), err.to_string())
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}
