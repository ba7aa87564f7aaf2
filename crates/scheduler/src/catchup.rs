// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Missed-run catch-up on startup (spec.md §4.5): the orchestrator is
//! expected to restart, so a time-driven schedule's `next_run_at` may
//! already be well in the past by the time the scheduler starts ticking
//! again. Pure function over `(strategy, last_run, next_run_at, now)` —
//! the caller (the scheduler's startup pass) is responsible for actually
//! enqueuing the resulting fire times.

use chrono::{DateTime, Utc};
use oj_core::{CatchUpPolicy, ScheduleStrategy};

use crate::error::SchedulerError;
use crate::next_run::next_run_time;

/// Cap on how many missed slots `CatchUpPolicy::All` will replay for a
/// single schedule, so a long-dead interval schedule with a short period
/// can't flood the queue on restart.
const MAX_CATCH_UP_FIRES: usize = 100;

/// The fire times a schedule should enqueue right now to catch up, plus its
/// next scheduled occurrence after those fires.
pub struct CatchUpPlan {
    pub fires: Vec<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
}

/// Compute the catch-up plan for a schedule whose `next_run_at` is at or
/// before `now`. Only meaningful for time-driven strategies; event-driven
/// and dependency schedules have no missed-slot notion and are skipped by
/// the caller before this is invoked.
pub fn plan_catch_up(
    strategy: &ScheduleStrategy,
    policy: CatchUpPolicy,
    next_run_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<CatchUpPlan, SchedulerError> {
    match policy {
        CatchUpPolicy::Skip => {
            let next = next_run_time(strategy, now, Some(next_run_at))?;
            Ok(CatchUpPlan { fires: Vec::new(), next_run_at: next })
        }
        CatchUpPolicy::One => {
            let next = next_run_time(strategy, now, Some(next_run_at))?;
            Ok(CatchUpPlan { fires: vec![next_run_at], next_run_at: next })
        }
        CatchUpPolicy::All => {
            let mut fires = vec![next_run_at];
            let mut cursor = next_run_at;
            while fires.len() < MAX_CATCH_UP_FIRES {
                match next_run_time(strategy, cursor, Some(cursor))? {
                    Some(candidate) if candidate <= now => {
                        fires.push(candidate);
                        cursor = candidate;
                    }
                    _ => break,
                }
            }
            let next = next_run_time(strategy, now, Some(cursor))?;
            Ok(CatchUpPlan { fires, next_run_at: next })
        }
    }
}

#[cfg(test)]
#[path = "catchup_tests.rs"]
mod tests;
