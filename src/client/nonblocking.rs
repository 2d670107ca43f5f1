//! Async metadata client.

use std::time::Duration;

use crate::cache::AsyncTokenCache;
use crate::client::fallback::{SessionCredential, TokenFailurePolicy};
use crate::client::{body_text, classify, parse_token_response, response_error, Disposition};
use crate::config::{FallbackDisposition, ImdsConfig};
use crate::error::{ImdsError, Result};
use crate::observability::metrics;
use crate::request::RequestBuilder;
use crate::retry::{ExponentialBackoff, RetryPolicy};
use crate::token::Token;
use crate::transport::AsyncTransport;

/// Async client for the instance metadata service.
///
/// Same behavioral contract as [`super::MetadataClient`], expressed without
/// blocking: retries are scheduled with `tokio::time::sleep`, and the token
/// cache hands out the latest available credential instead of queueing
/// contended callers behind an in-flight refresh.
///
/// Cancellation is dropping the returned future: that aborts the in-flight
/// HTTP call and any pending retry sleep.
pub struct AsyncMetadataClient<T> {
    transport: T,
    policy: Box<dyn RetryPolicy>,
    builder: RequestBuilder,
    cache: AsyncTokenCache<SessionCredential>,
    token_policy: TokenFailurePolicy,
}

impl<T: AsyncTransport> AsyncMetadataClient<T> {
    /// Client that surfaces token-handshake failures instead of degrading.
    pub fn new(transport: T, config: &ImdsConfig) -> Self {
        Self::build(transport, config, TokenFailurePolicy::FailFast)
    }

    /// Client that falls back to tokenless IMDSv1 requests when the
    /// handshake fails non-definitively.
    pub fn with_fallback(transport: T, config: &ImdsConfig) -> Self {
        let disposition = FallbackDisposition::resolve(config.v1_fallback_disabled);
        Self::build(transport, config, TokenFailurePolicy::Fallback(disposition))
    }

    fn build(transport: T, config: &ImdsConfig, token_policy: TokenFailurePolicy) -> Self {
        Self {
            transport,
            policy: Box::new(ExponentialBackoff::from(&config.retry)),
            builder: RequestBuilder::new(config.endpoint.clone(), config.token_ttl()),
            cache: AsyncTokenCache::new(),
            token_policy,
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Fetch the metadata resource at `path`, retrying per policy.
    pub async fn get(&self, path: &str) -> Result<String> {
        let max_retries = self.policy.max_retries();
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.attempt(path).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_retryable() => {
                    tracing::warn!(attempt, error = %err, "metadata request failed");
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }

            if attempt < max_retries {
                metrics::record_retry();
                let delay = self.policy.backoff(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let source = last_error.unwrap_or_else(|| {
            ImdsError::Transport("retry loop finished without a recorded error".into())
        });
        Err(ImdsError::RetriesExhausted {
            attempts: max_retries + 1,
            source: Box::new(source),
        })
    }

    async fn attempt(&self, path: &str) -> Result<String> {
        let credential = self
            .cache
            .get_or_refresh(|| self.fetch_credential())
            .await?;

        // A contended cache with nothing usable cached yet counts as a fetch
        // failure; transient, so the loop may retry.
        let Some(credential) = credential else {
            return Err(ImdsError::Transport(
                "token refresh in flight and no cached token available".into(),
            ));
        };

        let request = self.builder.data_request(path, credential.token())?;
        let response = self.transport.send(request).await.map_err(|err| {
            metrics::record_request("transport_error");
            err
        })?;

        match classify(response.status()) {
            Disposition::Success => {
                metrics::record_request("success");
                Ok(body_text(&response))
            }
            Disposition::Retryable => {
                metrics::record_request("server_error");
                Err(response_error(&response))
            }
            Disposition::Fatal => {
                metrics::record_request("client_error");
                Err(response_error(&response))
            }
        }
    }

    async fn fetch_credential(&self) -> Result<SessionCredential> {
        match self.fetch_token().await {
            Ok(token) => {
                metrics::record_token_refresh("ok");
                tracing::debug!(ttl_secs = token.ttl().as_secs(), "acquired session token");
                Ok(SessionCredential::Session(token))
            }
            Err(err) => {
                metrics::record_token_refresh("error");
                self.token_policy.on_token_failure(err, self.insecure_ttl())
            }
        }
    }

    async fn fetch_token(&self) -> Result<Token> {
        let request = self.builder.token_request()?;
        let response = self.transport.send(request).await?;
        match classify(response.status()) {
            Disposition::Success => parse_token_response(&response),
            _ => Err(response_error(&response)),
        }
    }

    fn insecure_ttl(&self) -> Duration {
        self.builder.token_ttl()
    }
}

impl<T> std::fmt::Debug for AsyncMetadataClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncMetadataClient")
            .field("builder", &self.builder)
            .field("token_policy", &self.token_policy)
            .finish()
    }
}
