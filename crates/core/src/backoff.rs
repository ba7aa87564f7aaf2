// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter for job retries (spec.md §4.1).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `delay(attempt) = min(max_delay, base_delay * multiplier^attempt) * jitter_factor`,
/// where `jitter_factor` is drawn uniformly from `[1 - jitter, 1 + jitter]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    pub max_retries: i32,
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    /// Fractional jitter in `[0.0, 1.0]`; 0 disables jitter entirely.
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self { max_retries: 3, base_delay_ms: 1_000, multiplier: 2.0, max_delay_ms: 300_000, jitter: 0.2 }
    }
}

impl BackoffPolicy {
    /// Whether a job with `retry_count` prior attempts may still be retried.
    pub fn should_retry(&self, retry_count: i32) -> bool {
        retry_count < self.max_retries
    }

    /// Delay before the `attempt`-th retry (0-indexed), deterministic save for
    /// jitter, which is sampled via [`fastrand`] and thus requires no `&mut`
    /// RNG state to be threaded through callers.
    pub fn delay(&self, attempt: i32) -> Duration {
        let unjittered = self.unjittered_delay_ms(attempt);
        let jittered = self.apply_jitter(unjittered);
        Duration::from_millis(jittered)
    }

    /// The delay before jitter is applied; exposed so tests can assert the
    /// exponential curve without fighting randomness.
    pub fn unjittered_delay_ms(&self, attempt: i32) -> u64 {
        let exp = self.multiplier.powi(attempt.max(0));
        let raw = self.base_delay_ms as f64 * exp;
        raw.min(self.max_delay_ms as f64).max(0.0) as u64
    }

    fn apply_jitter(&self, delay_ms: u64) -> u64 {
        if self.jitter <= 0.0 {
            return delay_ms;
        }
        let factor = 1.0 - self.jitter + fastrand::f64() * (2.0 * self.jitter);
        ((delay_ms as f64) * factor).round().max(0.0) as u64
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
