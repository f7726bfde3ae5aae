//! Backoff delay calculation.

use std::time::Duration;

use rand::Rng;

use crate::config::{BackoffStrategy, RetryConfig};

/// Delay to wait after failed attempt number `attempt` (1-based).
pub fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = match config.strategy {
        BackoffStrategy::Linear => config.base_delay_ms.saturating_mul(u64::from(attempt)),
        BackoffStrategy::Exponential => {
            let factor = 2u64.saturating_pow(attempt - 1);
            config.base_delay_ms.saturating_mul(factor)
        }
    };
    let capped_delay = delay_ms.min(config.max_delay_ms);

    if !config.jitter {
        return Duration::from_millis(capped_delay);
    }

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter).min(config.max_delay_ms))
}
