//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (TTL within service limits, endpoint parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: `ImdsConfig → Result<(), Vec<ValidationError>>`

use crate::config::schema::{ImdsConfig, MAX_TOKEN_TTL_SECS};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ImdsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = url::Url::parse(&config.endpoint) {
        errors.push(ValidationError {
            field: "endpoint",
            message: format!("'{}' is not a valid URL: {}", config.endpoint, e),
        });
    }

    if config.token_ttl_secs == 0 || config.token_ttl_secs > MAX_TOKEN_TTL_SECS {
        errors.push(ValidationError {
            field: "token_ttl_secs",
            message: format!(
                "must be between 1 and {MAX_TOKEN_TTL_SECS}, got {}",
                config.token_ttl_secs
            ),
        });
    }

    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError {
            field: "retry.base_delay_ms",
            message: format!(
                "base delay {}ms exceeds max delay {}ms",
                config.retry.base_delay_ms, config.retry.max_delay_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ImdsConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ImdsConfig {
            endpoint: "169.254.169.254".to_string(), // missing scheme
            token_ttl_secs: 0,
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "endpoint");
        assert_eq!(errors[1].field, "token_ttl_secs");
    }
}
