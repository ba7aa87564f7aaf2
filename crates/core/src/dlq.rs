// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dead-letter queue entry model (spec.md §3.4).

use crate::capability::Capability;
use crate::job::{ExecutionMode, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

crate::define_uuid_id! {
    /// Unique identifier for a dead-letter entry.
    pub struct DlqId;
}

/// One attempt's failure, preserved in `failure_history` (spec.md §3.4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub attempt: i32,
    pub robot_id: Option<String>,
    pub error_message: String,
    pub error_traceback: Option<String>,
    pub failed_at: DateTime<Utc>,
}

/// A job moved to the dead-letter queue after exhausting `max_retries`.
///
/// Carries a full snapshot of the original job's submission fields (spec.md
/// §3.4) so `replay_dlq` can reproduce the job faithfully rather than
/// resubmitting a bare workflow with its capability requirements and seeded
/// variables silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DlqEntry {
    pub id: DlqId,
    pub job_id: JobId,
    pub workflow_id: String,
    pub workflow_name: String,
    pub workflow_json: Json,
    pub priority: i32,
    pub max_retries: i32,
    pub execution_mode: ExecutionMode,
    pub required_capabilities: Vec<Capability>,
    pub initial_variables: Json,
    pub failure_history: Vec<FailureRecord>,
    pub moved_to_dlq_at: DateTime<Utc>,
    pub replayed: bool,
    pub replayed_at: Option<DateTime<Utc>>,
    pub replayed_as_job_id: Option<JobId>,
}

impl DlqEntry {
    /// A DLQ entry can only be replayed once; replay produces a fresh job id
    /// rather than resurrecting the original (Testable Property: DLQ entries
    /// are append-only history, not mutable job state).
    pub fn mark_replayed(&mut self, new_job_id: JobId, at: DateTime<Utc>) {
        self.replayed = true;
        self.replayed_at = Some(at);
        self.replayed_as_job_id = Some(new_job_id);
    }
}

crate::builder! {
    pub struct DlqEntryBuilder => DlqEntry {
        into {
            workflow_id: String = "wf-1",
            workflow_name: String = "test workflow",
        }
        set {
            job_id: JobId = JobId::new(),
            workflow_json: Json = Json::Object(Default::default()),
            priority: i32 = 0,
            max_retries: i32 = 3,
            execution_mode: ExecutionMode = ExecutionMode::Durable,
            required_capabilities: Vec<Capability> = Vec::new(),
            initial_variables: Json = Json::Object(Default::default()),
            failure_history: Vec<FailureRecord> = Vec::new(),
            replayed: bool = false,
        }
        option {
            replayed_at: DateTime<Utc> = None,
            replayed_as_job_id: JobId = None,
        }
        computed {
            id: DlqId = DlqId::new(),
            moved_to_dlq_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "dlq_tests.rs"]
mod tests;
