// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Business calendars gate a fire against working days/hours, holidays, and
//! ad hoc blackout windows (spec.md §4.5 calendar gate). Pure data + pure
//! functions — no I/O, so the scheduler's tick loop can call
//! `can_execute`/`next_working_time` synchronously.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use std::collections::HashSet;

/// What the scheduler does with a fire that a calendar denies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarDenyPolicy {
    /// Drop the fire; wait for the schedule's own next `next_run_time`.
    Skip,
    /// Defer the fire to the calendar's next working instant.
    AdvanceToNextWorkingTime,
}

/// A named business calendar. `workflow_exceptions` lets specific workflows
/// bypass the calendar entirely (e.g. an always-on health check schedule
/// sharing a calendar id with business-hours workflows).
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    pub id: String,
    pub timezone: chrono_tz::Tz,
    pub working_days: HashSet<Weekday>,
    pub working_hours: (NaiveTime, NaiveTime),
    pub holidays: HashSet<NaiveDate>,
    pub blackouts: Vec<(DateTime<Utc>, DateTime<Utc>)>,
    pub workflow_exceptions: HashSet<String>,
}

impl BusinessCalendar {
    /// Always-open calendar, useful as a default when a schedule names a
    /// `calendar_id` the scheduler has not (yet) loaded.
    pub fn always_open(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timezone: chrono_tz::UTC,
            working_days: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun]
                .into_iter()
                .collect(),
            working_hours: (NaiveTime::from_hms_opt(0, 0, 0).unwrap(), NaiveTime::from_hms_opt(23, 59, 59).unwrap()),
            holidays: HashSet::new(),
            blackouts: Vec::new(),
            workflow_exceptions: HashSet::new(),
        }
    }

    /// Whether `workflow_id` may execute at `at`.
    pub fn can_execute(&self, at: DateTime<Utc>, workflow_id: &str) -> bool {
        if self.workflow_exceptions.contains(workflow_id) {
            return true;
        }
        if self.blackouts.iter().any(|(start, end)| at >= *start && at < *end) {
            return false;
        }
        let local = at.with_timezone(&self.timezone);
        if self.holidays.contains(&local.date_naive()) {
            return false;
        }
        if !self.working_days.contains(&local.weekday()) {
            return false;
        }
        let time = local.time();
        time >= self.working_hours.0 && time <= self.working_hours.1
    }

    /// The next instant at or after `from` that `can_execute` would accept,
    /// scanning forward in 15-minute steps up to 30 days. Used by
    /// [`CalendarDenyPolicy::AdvanceToNextWorkingTime`].
    pub fn next_working_time(&self, from: DateTime<Utc>, workflow_id: &str) -> Option<DateTime<Utc>> {
        const STEP: Duration = Duration::minutes(15);
        const HORIZON: Duration = Duration::days(30);
        let mut candidate = from;
        let deadline = from + HORIZON;
        while candidate < deadline {
            if self.can_execute(candidate, workflow_id) {
                return Some(candidate);
            }
            candidate += STEP;
        }
        None
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
