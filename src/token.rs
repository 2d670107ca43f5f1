//! IMDSv2 session token value object.

use std::time::{Duration, Instant};

/// A session token returned by the metadata service, paired with the
/// instant it was issued and the TTL the service granted.
///
/// Tokens are never mutated; a refresh constructs a new one and swaps it
/// into the cache atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    ttl: Duration,
    created_at: Instant,
}

impl Token {
    /// Create a token, capturing the current instant as its creation time.
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        Self {
            value: value.into(),
            ttl,
            created_at: Instant::now(),
        }
    }

    /// The raw token string, sent in the `x-aws-ec2-metadata-token` header.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The TTL granted by the service.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the token's TTL has elapsed.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}
