// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `workflow_id → {robot_id → last_seen}` state-affinity tracking
//! (spec.md §4.2 state-affinity bonus). Pure in-memory bookkeeping; the
//! Coordinator owns the mutable instance (typically behind a lock of its
//! own) and records a hit every time a job completes successfully on a
//! robot.

use chrono::{DateTime, Utc};
use oj_core::RobotId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct StateAffinityTracker {
    entries: HashMap<(String, RobotId), DateTime<Utc>>,
}

impl StateAffinityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `robot_id` most recently ran `workflow_id` at `now`.
    pub fn record(&mut self, workflow_id: &str, robot_id: &RobotId, now: DateTime<Utc>) {
        self.entries.insert((workflow_id.to_string(), robot_id.clone()), now);
    }

    /// Whether `robot_id` has a fresh (within `ttl_secs`) affinity entry for
    /// `workflow_id` as of `now`.
    pub fn is_fresh(&self, workflow_id: &str, robot_id: &RobotId, now: DateTime<Utc>, ttl_secs: u64) -> bool {
        match self.entries.get(&(workflow_id.to_string(), robot_id.clone())) {
            Some(last_seen) => (now - *last_seen).num_seconds() <= ttl_secs as i64,
            None => false,
        }
    }

    /// Drop every entry older than `ttl_secs` as of `now`. Purely a memory
    /// cap; correctness does not depend on calling this.
    pub fn prune(&mut self, now: DateTime<Utc>, ttl_secs: u64) {
        self.entries.retain(|_, last_seen| (now - *last_seen).num_seconds() <= ttl_secs as i64);
    }
}

#[cfg(test)]
#[path = "affinity_tests.rs"]
mod tests;
