// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sliding-window rate limiter, one counter per schedule (spec.md §4.5 rate
//! limiter). Mirrors the `StateAffinityTracker` shape in `oj-assignment`:
//! plain in-memory bookkeeping behind a `DashMap` for per-schedule locking.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use oj_core::{RateLimitConfig, ScheduleId};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allow,
    /// Rejected; retry no sooner than `wait_time` from now.
    Reject { wait_time: chrono::Duration },
}

#[derive(Default)]
pub struct RateLimiter {
    windows: DashMap<ScheduleId, Vec<DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-record in one step: if the window has room, records `now`
    /// as a fresh attempt and returns `Allow`; otherwise leaves the window
    /// untouched and returns the wait time until the oldest entry expires.
    pub fn try_acquire(&self, schedule_id: ScheduleId, config: &RateLimitConfig, now: DateTime<Utc>) -> RateLimitDecision {
        let window = Duration::seconds(config.window_seconds.max(1));
        let mut entry = self.windows.entry(schedule_id).or_default();
        entry.retain(|seen| now - *seen < window);

        if entry.len() >= config.max_executions as usize {
            let oldest = entry.iter().min().copied().unwrap_or(now);
            return RateLimitDecision::Reject { wait_time: (oldest + window) - now };
        }

        entry.push(now);
        RateLimitDecision::Allow
    }
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod tests;
