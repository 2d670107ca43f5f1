//! Exponential backoff with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before retrying after the given one-based attempt: the base delay
/// doubled per prior attempt, capped at `max`, plus 0-10% jitter.
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exponent = 2u32.saturating_pow(attempt - 1);
    let capped = base.saturating_mul(exponent).min(max);

    let jitter_range = capped / 10;
    if jitter_range.is_zero() {
        return capped;
    }
    capped + jitter_range.mul_f64(rand::thread_rng().gen::<f64>())
}
