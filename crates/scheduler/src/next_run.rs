// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure next-fire-time computation for every [`ScheduleStrategy`] variant
//! (spec.md §4.5's polymorphic `next_run_time`/`validate` capability set).
//! No `Queue` or clock dependency beyond the `now`/`last_run` passed in, so
//! this is exercised directly in unit tests.

use chrono::{DateTime, Utc};
use oj_core::ScheduleStrategy;
use std::str::FromStr;

use crate::error::SchedulerError;

/// The next instant at which `strategy` should fire, given the current time
/// and the last time it fired (`None` if it has never fired). Event-driven
/// and dependency strategies have no time-driven notion of "next" and
/// always return `None` — they are triggered via `trigger_event`/
/// `notify_completion` instead.
pub fn next_run_time(
    strategy: &ScheduleStrategy,
    now: DateTime<Utc>,
    last_run: Option<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>, SchedulerError> {
    match strategy {
        ScheduleStrategy::Cron { expression, timezone } => next_cron_fire(expression, timezone, now),
        ScheduleStrategy::Interval { seconds } => Ok(Some(next_interval_fire(*seconds, now, last_run))),
        ScheduleStrategy::OneTime { at } => Ok(if last_run.is_some() || *at < now { None } else { Some(*at) }),
        ScheduleStrategy::Event { .. } | ScheduleStrategy::Dependency { .. } => Ok(None),
    }
}

fn next_cron_fire(expression: &str, timezone: &str, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, SchedulerError> {
    let tz: chrono_tz::Tz = timezone.parse().map_err(|_| SchedulerError::InvalidTimezone(timezone.to_string()))?;
    let schedule = cron::Schedule::from_str(&normalize_cron_expression(expression))
        .map_err(|source| SchedulerError::InvalidCron { expression: expression.to_string(), source })?;
    let now_in_tz = now.with_timezone(&tz);
    Ok(schedule.after(&now_in_tz).next().map(|fire| fire.with_timezone(&Utc)))
}

/// spec.md §4.5 mandates "standard 5-field cron" (`0 9 * * MON-FRI`), but the
/// `cron` crate requires a leading seconds field (6 or 7 fields). Prepend a
/// `0` seconds field to bare 5-field input so the spec's own literal
/// expressions parse; 6/7-field input (already carrying seconds, optionally
/// a year field) passes through unchanged.
fn normalize_cron_expression(expression: &str) -> String {
    if expression.split_whitespace().count() == 5 {
        format!("0 {expression}")
    } else {
        expression.to_string()
    }
}

fn next_interval_fire(seconds: i64, now: DateTime<Utc>, last_run: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last_run {
        Some(last) => last + chrono::Duration::seconds(seconds.max(1)),
        None => now + chrono::Duration::seconds(seconds.max(1)),
    }
}

/// Syntactic/semantic validation performed once at schedule creation time,
/// independent of `next_run_time`'s runtime evaluation.
pub fn validate(strategy: &ScheduleStrategy) -> Result<(), SchedulerError> {
    match strategy {
        ScheduleStrategy::Cron { expression, timezone } => {
            let _: chrono_tz::Tz = timezone.parse().map_err(|_| SchedulerError::InvalidTimezone(timezone.to_string()))?;
            cron::Schedule::from_str(&normalize_cron_expression(expression))
                .map(|_| ())
                .map_err(|source| SchedulerError::InvalidCron { expression: expression.to_string(), source })
        }
        ScheduleStrategy::Interval { .. }
        | ScheduleStrategy::OneTime { .. }
        | ScheduleStrategy::Event { .. }
        | ScheduleStrategy::Dependency { .. } => Ok(()),
    }
}

#[cfg(test)]
#[path = "next_run_tests.rs"]
mod tests;
