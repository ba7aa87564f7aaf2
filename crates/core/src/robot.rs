// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot identifier and data model (spec.md §3.2).

use crate::capability::Capability;
use crate::job::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

crate::define_string_id! {
    /// Unique identifier for a connected robot. Chosen by the robot itself
    /// at registration time, not generated by the orchestrator.
    pub struct RobotId;
}

/// Status of a robot's WebSocket connection (spec.md §4.3 state machine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Idle,
    Busy,
    Offline,
    Paused,
    Error,
}

crate::simple_display! {
    RobotStatus {
        Idle => "idle",
        Busy => "busy",
        Offline => "offline",
        Paused => "paused",
        Error => "error",
    }
}

/// Live system metrics reported on heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

impl Default for RobotMetrics {
    fn default() -> Self {
        Self { cpu_percent: 0.0, memory_percent: 0.0 }
    }
}

/// A connected robot, as tracked by the fleet coordinator's in-memory
/// registry (and the durable `robots` directory subset).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Robot {
    pub id: RobotId,
    pub name: String,
    pub environment: String,
    pub capabilities: Vec<Capability>,
    pub max_concurrent_jobs: u32,
    pub current_jobs: HashSet<JobId>,
    pub status: RobotStatus,
    pub tags: HashSet<String>,
    pub last_heartbeat_at: DateTime<Utc>,
    pub connected_at: DateTime<Utc>,
    pub metrics: RobotMetrics,
}

impl Robot {
    /// `|current_jobs| <= max_concurrent_jobs` (invariant).
    pub fn has_capacity(&self) -> bool {
        (self.current_jobs.len() as u32) < self.max_concurrent_jobs
    }

    pub fn load_fraction(&self) -> f64 {
        if self.max_concurrent_jobs == 0 {
            return 1.0;
        }
        self.current_jobs.len() as f64 / self.max_concurrent_jobs as f64
    }

    /// Whether this robot advertises every capability a job requires.
    pub fn covers(&self, required: &[Capability]) -> bool {
        crate::capability::covers(&self.capabilities, required)
    }

    /// Assign a job, enforcing the concurrency cap.
    pub fn assign(&mut self, job_id: JobId) -> bool {
        if !self.has_capacity() {
            return false;
        }
        let inserted = self.current_jobs.insert(job_id);
        if !self.current_jobs.is_empty() {
            self.status = RobotStatus::Busy;
        }
        inserted
    }

    /// Release a job (completion, failure, or recovery reassignment).
    pub fn release(&mut self, job_id: &JobId) {
        self.current_jobs.remove(job_id);
        if self.current_jobs.is_empty() && self.status == RobotStatus::Busy {
            self.status = RobotStatus::Idle;
        }
    }
}

crate::builder! {
    pub struct RobotBuilder => Robot {
        into {
            id: RobotId = "robot-1",
            name: String = "test-robot",
            environment: String = "default",
        }
        set {
            capabilities: Vec<Capability> = Vec::new(),
            max_concurrent_jobs: u32 = 1,
            current_jobs: HashSet<JobId> = HashSet::new(),
            status: RobotStatus = RobotStatus::Idle,
            tags: HashSet<String> = HashSet::new(),
            metrics: RobotMetrics = RobotMetrics::default(),
        }
        computed {
            last_heartbeat_at: DateTime<Utc> = Utc::now(),
            connected_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "robot_tests.rs"]
mod tests;
