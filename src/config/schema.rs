//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files and
//! carry defaults matching the metadata service's documented limits.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable that disables IMDSv1 fallback when set truthy.
pub const V1_DISABLED_ENV: &str = "AWS_EC2_METADATA_V1_DISABLED";

/// Maximum session-token TTL the metadata service will grant (6 hours).
pub const MAX_TOKEN_TTL_SECS: u64 = 21_600;

/// Root configuration for the metadata client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImdsConfig {
    /// Base endpoint of the metadata service.
    pub endpoint: String,

    /// TTL requested for session tokens, in seconds (1..=21600).
    pub token_ttl_secs: u64,

    /// Retry configuration.
    pub retry: RetryConfig,

    /// Explicit IMDSv1 fallback override. `None` defers to the
    /// `AWS_EC2_METADATA_V1_DISABLED` environment variable.
    pub v1_fallback_disabled: Option<bool>,
}

impl Default for ImdsConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://169.254.169.254".to_string(),
            token_ttl_secs: MAX_TOKEN_TTL_SECS,
            retry: RetryConfig::default(),
            v1_fallback_disabled: None,
        }
    }
}

impl ImdsConfig {
    /// The configured token TTL as a [`Duration`].
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt (total attempts = max_retries + 1).
    pub max_retries: u32,

    /// Base delay for the first retry, in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound on any single backoff delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 20_000,
        }
    }
}

/// Whether IMDSv1 fallback is disabled, and which surface said so.
///
/// Resolved once per client construction and consulted only inside the
/// token-fetch failure handler.
#[derive(Debug, Clone)]
pub struct FallbackDisposition {
    disabled: bool,
    surface: &'static str,
}

impl FallbackDisposition {
    /// Resolve the disposition: an explicit config value wins, otherwise the
    /// `AWS_EC2_METADATA_V1_DISABLED` environment variable is consulted.
    pub fn resolve(explicit: Option<bool>) -> Self {
        if let Some(disabled) = explicit {
            return Self {
                disabled,
                surface: "the v1_fallback_disabled client setting",
            };
        }
        let disabled = std::env::var(V1_DISABLED_ENV)
            .map(|v| {
                let v = v.trim();
                v.eq_ignore_ascii_case("true") || v == "1"
            })
            .unwrap_or(false);
        Self {
            disabled,
            surface: "the AWS_EC2_METADATA_V1_DISABLED environment variable \
                      (profile key ec2_metadata_v1_disabled)",
        }
    }

    /// A disposition that always permits fallback (test and default paths).
    pub fn enabled() -> Self {
        Self {
            disabled: false,
            surface: "the v1_fallback_disabled client setting",
        }
    }

    /// A disposition that forbids fallback, attributed to the explicit setting.
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            surface: "the v1_fallback_disabled client setting",
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Human-readable name of the surface that produced this disposition,
    /// used in `FallbackDisabled` error messages.
    pub fn surface(&self) -> &'static str {
        self.surface
    }
}
