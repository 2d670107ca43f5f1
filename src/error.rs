//! Error definitions for metadata service operations.

use thiserror::Error;

/// Errors that can occur while talking to the instance metadata service.
///
/// Payloads are plain strings so the type stays `Clone`; the blocking token
/// cache hands one fetch failure to every caller blocked on that refresh.
#[derive(Debug, Clone, Error)]
pub enum ImdsError {
    /// I/O failure sending the request or receiving the response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The metadata service answered with a 5xx status.
    #[error("metadata service error: HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The metadata service rejected the request (non-2xx, non-5xx).
    #[error("metadata request rejected: HTTP {status}: {body}")]
    Client { status: u16, body: String },

    /// Token response was missing its TTL header or carried an empty body.
    #[error("malformed token response: {0}")]
    TokenFormat(String),

    /// All attempts were used up; wraps the last retryable failure seen.
    #[error("exceeded maximum number of retries ({attempts} attempts)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<ImdsError>,
    },

    /// Token acquisition failed and IMDSv1 fallback is turned off.
    #[error(
        "failed to acquire an IMDSv2 session token and fallback to IMDSv1 \
         is disabled via {surface}"
    )]
    FallbackDisabled { surface: String },

    /// A blocking backoff sleep was cancelled.
    #[error("operation interrupted while waiting to retry")]
    Interrupted,

    /// The configured endpoint or requested path does not form a valid URI.
    #[error("invalid metadata endpoint: {0}")]
    InvalidEndpoint(String),
}

impl ImdsError {
    /// Whether the retry loop may try again after this error.
    ///
    /// Transport failures and 5xx responses are retryable; everything else
    /// aborts the loop immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ImdsError::Transport(_) | ImdsError::Server { .. })
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ImdsError::Server { status, .. } | ImdsError::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for metadata operations.
pub type Result<T> = std::result::Result<T, ImdsError>;
