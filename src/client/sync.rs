//! Blocking metadata client.

use std::time::Duration;

use crate::cache::TokenCache;
use crate::client::cancel::CancelHandle;
use crate::client::fallback::{SessionCredential, TokenFailurePolicy};
use crate::client::{body_text, classify, parse_token_response, response_error, Disposition};
use crate::config::{FallbackDisposition, ImdsConfig};
use crate::error::{ImdsError, Result};
use crate::observability::metrics;
use crate::request::RequestBuilder;
use crate::retry::{ExponentialBackoff, RetryPolicy};
use crate::token::Token;
use crate::transport::BlockingTransport;

/// Blocking client for the instance metadata service.
///
/// One thread owns the whole retry loop, including backoff sleeps; the
/// sleeps are interruptible through [`CancelHandle`]. The token cache is
/// shared across concurrent `get` calls on a shared client, with at most
/// one token fetch in flight at a time.
pub struct MetadataClient<T> {
    transport: T,
    policy: Box<dyn RetryPolicy>,
    builder: RequestBuilder,
    cache: TokenCache<SessionCredential>,
    token_policy: TokenFailurePolicy,
    cancel: CancelHandle,
}

impl<T: BlockingTransport> MetadataClient<T> {
    /// Client that surfaces token-handshake failures instead of degrading.
    pub fn new(transport: T, config: &ImdsConfig) -> Self {
        Self::build(transport, config, TokenFailurePolicy::FailFast)
    }

    /// Client that falls back to tokenless IMDSv1 requests when the
    /// handshake fails non-definitively. The disposition is resolved once,
    /// here, from the explicit setting or the environment.
    pub fn with_fallback(transport: T, config: &ImdsConfig) -> Self {
        let disposition = FallbackDisposition::resolve(config.v1_fallback_disabled);
        Self::build(transport, config, TokenFailurePolicy::Fallback(disposition))
    }

    fn build(transport: T, config: &ImdsConfig, token_policy: TokenFailurePolicy) -> Self {
        Self {
            transport,
            policy: Box::new(ExponentialBackoff::from(&config.retry)),
            builder: RequestBuilder::new(config.endpoint.clone(), config.token_ttl()),
            cache: TokenCache::new(),
            token_policy,
            cancel: CancelHandle::new(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Handle for interrupting in-flight backoff sleeps from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Fetch the metadata resource at `path`, retrying per policy.
    pub fn get(&self, path: &str) -> Result<String> {
        let max_retries = self.policy.max_retries();
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.attempt(path) {
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
                    self.cancel.sleep(delay)?;
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

    fn attempt(&self, path: &str) -> Result<String> {
        let credential = self.cache.get_or_refresh(|| self.fetch_credential())?;

        let request = self.builder.data_request(path, credential.token())?;
        let response = self.transport.send(request).map_err(|err| {
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

    fn fetch_credential(&self) -> Result<SessionCredential> {
        match self.fetch_token() {
            Ok(token) => {
                metrics::record_token_refresh("ok");
                tracing::debug!(ttl_secs = token.ttl().as_secs(), "acquired session token");
                Ok(SessionCredential::Session(token))
            }
            Err(err) => {
                metrics::record_token_refresh("error");
                self.token_policy
                    .on_token_failure(err, self.insecure_ttl())
            }
        }
    }

    fn fetch_token(&self) -> Result<Token> {
        let request = self.builder.token_request()?;
        let response = self.transport.send(request)?;
        match classify(response.status()) {
            Disposition::Success => parse_token_response(&response),
            _ => Err(response_error(&response)),
        }
    }

    fn insecure_ttl(&self) -> Duration {
        self.builder.token_ttl()
    }
}

impl<T> std::fmt::Debug for MetadataClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataClient")
            .field("builder", &self.builder)
            .field("token_policy", &self.token_policy)
            .finish()
    }
}
