// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency-schedule satisfaction tracking (spec.md §4.5 Dependency
//! strategy). Records each upstream schedule's most recent completion
//! outcome and answers `wait_for_all`/any satisfaction queries against a
//! TTL-bounded history, the same shape as `StateAffinityTracker` in
//! `oj-assignment`.

use chrono::{DateTime, Duration, Utc};
use oj_core::ScheduleId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Completion {
    at: DateTime<Utc>,
    succeeded: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyTracker {
    last_completion: HashMap<ScheduleId, Completion>,
}

impl DependencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `schedule_id` completed (successfully or not) at `at`.
    pub fn notify_completion(&mut self, schedule_id: ScheduleId, succeeded: bool, at: DateTime<Utc>) {
        self.last_completion.insert(schedule_id, Completion { at, succeeded });
    }

    /// Whether a dependency schedule with these upstreams is satisfied as of
    /// `now`: every (or any, per `wait_for_all`) upstream must have a
    /// completion recorded within `ttl_secs`, and if
    /// `trigger_on_success_only` is set, that completion must be a success.
    pub fn is_satisfied(
        &self,
        upstream: &[ScheduleId],
        wait_for_all: bool,
        trigger_on_success_only: bool,
        now: DateTime<Utc>,
        ttl_secs: u64,
    ) -> bool {
        if upstream.is_empty() {
            return false;
        }
        let ttl = Duration::seconds(ttl_secs as i64);
        let satisfied_by = |id: &ScheduleId| {
            self.last_completion
                .get(id)
                .is_some_and(|c| now - c.at <= ttl && (!trigger_on_success_only || c.succeeded))
        };

        if wait_for_all {
            upstream.iter().all(satisfied_by)
        } else {
            upstream.iter().any(satisfied_by)
        }
    }

    /// Drop completions older than `ttl_secs`, bounding memory growth.
    pub fn prune(&mut self, now: DateTime<Utc>, ttl_secs: u64) {
        let ttl = Duration::seconds(ttl_secs as i64);
        self.last_completion.retain(|_, c| now - c.at <= ttl);
    }
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
