// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure concurrency-policy decision (spec.md §4.5): what to do about a fire
//! when a prior run of the same schedule may still be in flight.

use chrono::{DateTime, Duration, Utc};
use oj_core::ConcurrencyPolicy;

/// What the scheduler should do with a newly-fired run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyDecision {
    /// Enqueue the new run.
    Proceed,
    /// Drop the fire entirely; a run is already in flight (or within the
    /// coalesce window) and the policy forbids/coalesces.
    Skip,
    /// Cancel the in-flight run (caller's responsibility) and enqueue the
    /// new one.
    ReplaceInFlight,
}

/// `in_flight` is whether a previously-dispatched run of this schedule has
/// not yet completed. `last_fired_at` is when the schedule last actually
/// enqueued a job, used by `Coalesce` to detect near-simultaneous triggers
/// independent of whether that run has completed.
pub fn decide(
    policy: ConcurrencyPolicy,
    in_flight: bool,
    last_fired_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ConcurrencyDecision {
    match policy {
        ConcurrencyPolicy::Allow => ConcurrencyDecision::Proceed,
        ConcurrencyPolicy::Forbid => {
            if in_flight {
                ConcurrencyDecision::Skip
            } else {
                ConcurrencyDecision::Proceed
            }
        }
        ConcurrencyPolicy::Replace => {
            if in_flight {
                ConcurrencyDecision::ReplaceInFlight
            } else {
                ConcurrencyDecision::Proceed
            }
        }
        ConcurrencyPolicy::Coalesce { window_seconds } => match last_fired_at {
            Some(last) if now - last < Duration::seconds(window_seconds.max(0)) => ConcurrencyDecision::Skip,
            _ => ConcurrencyDecision::Proceed,
        },
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;
