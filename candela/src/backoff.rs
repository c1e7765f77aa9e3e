use std::time::Duration;

use candela_core::RetryConfig;
use rand::Rng;

/// Add up to `jitter_percent` of `base_ms` as random jitter.
#[must_use]
pub fn jitter_wait(base_ms: u64, jitter_percent: u8) -> u64 {
    let jitter_range = if jitter_percent == 0 {
        1
    } else {
        std::cmp::max(1, base_ms.saturating_mul(u64::from(jitter_percent)) / 100)
    };
    let mut rng = rand::rng();
    base_ms + rng.random_range(0..jitter_range)
}

/// Sleep before retry number `attempt` (0-based) under `policy`.
#[must_use]
pub fn retry_delay(policy: &RetryConfig, attempt: u32) -> Duration {
    Duration::from_millis(jitter_wait(
        policy.base_delay_ms(attempt),
        policy.jitter_percent.min(100),
    ))
}
