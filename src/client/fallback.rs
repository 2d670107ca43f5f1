//! Token-failure policy and the cached session disposition.

use std::time::{Duration, Instant};

use crate::cache::Expires;
use crate::config::FallbackDisposition;
use crate::error::{ImdsError, Result};
use crate::observability::metrics;
use crate::token::Token;

/// What the client caches between calls: either a live session token, or
/// the decision that this instance only speaks tokenless IMDSv1.
///
/// The insecure disposition carries its own stale instant so that, once it
/// lapses, the next call re-attempts the IMDSv2 handshake. Fallback is a
/// posture, not a one-way door.
#[derive(Debug, Clone)]
pub(crate) enum SessionCredential {
    Session(Token),
    Insecure { stale_at: Instant },
}

impl SessionCredential {
    pub(crate) fn insecure(ttl: Duration) -> Self {
        Self::Insecure {
            stale_at: Instant::now() + ttl,
        }
    }

    /// Token header value for data requests; `None` means tokenless.
    pub(crate) fn token(&self) -> Option<&str> {
        match self {
            Self::Session(token) => Some(token.value()),
            Self::Insecure { .. } => None,
        }
    }
}

impl Expires for SessionCredential {
    fn is_expired(&self) -> bool {
        match self {
            Self::Session(token) => token.is_expired(),
            Self::Insecure { stale_at } => Instant::now() > *stale_at,
        }
    }
}

/// How a client reacts when the token handshake fails.
#[derive(Debug, Clone)]
pub(crate) enum TokenFailurePolicy {
    /// Surface the failure; the retry loop classifies it.
    FailFast,
    /// Degrade to tokenless IMDSv1 unless disabled or the rejection was
    /// definitive (HTTP 400).
    Fallback(FallbackDisposition),
}

impl TokenFailurePolicy {
    /// Decide what a token-fetch failure means for the current attempt.
    ///
    /// `insecure_ttl` bounds how long a fallback decision stays cached
    /// before the handshake is re-attempted.
    pub(crate) fn on_token_failure(
        &self,
        err: ImdsError,
        insecure_ttl: Duration,
    ) -> Result<SessionCredential> {
        let disposition = match self {
            Self::FailFast => return Err(err),
            Self::Fallback(disposition) => disposition,
        };

        // A 400 on the token request is a definitive rejection: the request
        // itself was malformed, and degrading would hide that.
        if err.status() == Some(400) {
            return Err(err);
        }

        if disposition.is_disabled() {
            tracing::error!(
                error = %err,
                "token acquisition failed and IMDSv1 fallback is disabled"
            );
            return Err(ImdsError::FallbackDisabled {
                surface: disposition.surface().to_string(),
            });
        }

        tracing::warn!(
            error = %err,
            "token acquisition failed, falling back to tokenless IMDSv1 requests"
        );
        metrics::record_fallback();
        Ok(SessionCredential::insecure(insecure_ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_500() -> ImdsError {
        ImdsError::Server {
            status: 500,
            body: "unavailable".into(),
        }
    }

    #[test]
    fn test_fail_fast_propagates() {
        let policy = TokenFailurePolicy::FailFast;
        let err = policy
            .on_token_failure(server_500(), Duration::from_secs(60))
            .unwrap_err();
        assert!(matches!(err, ImdsError::Server { status: 500, .. }));
    }

    #[test]
    fn test_fallback_on_server_error() {
        let policy = TokenFailurePolicy::Fallback(FallbackDisposition::enabled());
        let credential = policy
            .on_token_failure(server_500(), Duration::from_secs(60))
            .unwrap();
        assert!(credential.token().is_none());
        assert!(!credential.is_expired());
    }

    #[test]
    fn test_token_400_never_falls_back() {
        let policy = TokenFailurePolicy::Fallback(FallbackDisposition::enabled());
        let err = policy
            .on_token_failure(
                ImdsError::Client {
                    status: 400,
                    body: "bad request".into(),
                },
                Duration::from_secs(60),
            )
            .unwrap_err();
        assert!(matches!(err, ImdsError::Client { status: 400, .. }));
    }

    #[test]
    fn test_disabled_fallback_names_surface() {
        let policy = TokenFailurePolicy::Fallback(FallbackDisposition::disabled());
        let err = policy
            .on_token_failure(server_500(), Duration::from_secs(60))
            .unwrap_err();
        match err {
            ImdsError::FallbackDisabled { surface } => {
                assert!(surface.contains("v1_fallback_disabled"));
            }
            other => panic!("expected FallbackDisabled, got {other:?}"),
        }
    }

    #[test]
    fn test_insecure_disposition_expires() {
        let credential = SessionCredential::insecure(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(credential.is_expired());

        let credential = SessionCredential::insecure(Duration::from_secs(3600));
        assert!(!credential.is_expired());
    }
}
