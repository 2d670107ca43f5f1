//! Metrics collection.
//!
//! # Metrics
//! - `imds_requests_total` (counter): data requests by outcome
//! - `imds_retries_total` (counter): retryable failures that triggered a retry
//! - `imds_token_refreshes_total` (counter): token fetches by outcome
//! - `imds_fallback_engagements_total` (counter): IMDSv1 fallback activations

use metrics::counter;

/// Record the final classification of one data-request attempt.
pub fn record_request(outcome: &'static str) {
    counter!("imds_requests_total", "outcome" => outcome).increment(1);
}

/// Record a retryable failure that will be retried.
pub fn record_retry() {
    counter!("imds_retries_total").increment(1);
}

/// Record a token fetch by outcome ("ok", "error").
pub fn record_token_refresh(outcome: &'static str) {
    counter!("imds_token_refreshes_total", "outcome" => outcome).increment(1);
}

/// Record an IMDSv1 fallback engagement.
pub fn record_fallback() {
    counter!("imds_fallback_engagements_total").increment(1);
}
