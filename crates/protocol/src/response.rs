// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use oj_core::{DlqEntry, Job, JobId, Robot, Schedule};
use serde::{Deserialize, Serialize};

/// Queue depth by status, returned by [`crate::Query::QueueStats`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct QueueStatsSummary {
    pub pending: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub dlq: u64,
    pub throughput_per_min: f64,
}

/// Rolling SLA compliance for a single schedule's recent executions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SlaStatus {
    pub success_rate: f64,
    pub p95_duration_ms: i64,
    pub window_executions: u32,
    pub breached: bool,
}

/// Response to an admin/query-surface [`crate::Query`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    QueueStats { stats: QueueStatsSummary },
    Dlq { entries: Vec<DlqEntry> },
    DlqReplayed { new_job_id: JobId, replayed_at: DateTime<Utc> },
    Robots { robots: Vec<Robot> },
    Robot { robot: Option<Box<Robot>> },
    Schedules { schedules: Vec<Schedule> },
    Schedule { schedule: Option<Box<Schedule>> },
    Sla { status: SlaStatus },
    Job { job: Option<Box<Job>> },
    Error { message: String },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
