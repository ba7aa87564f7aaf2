// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier and data model (spec.md §3.1).

use crate::capability::Capability;
use crate::robot::RobotId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

crate::define_uuid_id! {
    /// Unique identifier for a job instance. Immutable once enqueued.
    pub struct JobId;
}

/// Status of a job. Exactly one transition leaves `Pending`, effected by an
/// atomic claim; `Completed`, `Failed`, `Cancelled`, and `Dlq` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
    Dlq,
}

impl JobStatus {
    /// No job ever transitions out of a terminal status (Testable Property 2).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled | JobStatus::Dlq)
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
        Dlq => "dlq",
    }
}

/// How a job's workflow should be executed by the robot runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Durable,
    Realtime,
}

crate::simple_display! {
    ExecutionMode {
        Durable => "durable",
        Realtime => "realtime",
    }
}

/// A durable mid-workflow checkpoint reported by a robot (§6.3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub node_id: String,
    pub variables: Json,
    pub resumable: bool,
}

/// Parameters accepted when enqueuing a new job.
#[derive(Debug, Clone)]
pub struct JobSubmission {
    pub workflow_id: String,
    pub workflow_name: String,
    pub workflow_json: Json,
    pub priority: i32,
    pub requested_start: Option<DateTime<Utc>>,
    pub max_retries: i32,
    pub execution_mode: ExecutionMode,
    pub required_capabilities: Vec<Capability>,
    pub initial_variables: Json,
}

impl JobSubmission {
    pub fn builder(workflow_id: impl Into<String>, workflow_json: Json) -> JobSubmissionBuilder {
        JobSubmissionBuilder {
            workflow_id: workflow_id.into(),
            workflow_name: String::new(),
            workflow_json,
            priority: 0,
            requested_start: None,
            max_retries: 3,
            execution_mode: ExecutionMode::Durable,
            required_capabilities: Vec::new(),
            initial_variables: Json::Object(Default::default()),
        }
    }
}

pub struct JobSubmissionBuilder {
    workflow_id: String,
    workflow_name: String,
    workflow_json: Json,
    priority: i32,
    requested_start: Option<DateTime<Utc>>,
    max_retries: i32,
    execution_mode: ExecutionMode,
    required_capabilities: Vec<Capability>,
    initial_variables: Json,
}

impl JobSubmissionBuilder {
    crate::setters! {
        into {
            workflow_name: String,
        }
        set {
            priority: i32,
            max_retries: i32,
            execution_mode: ExecutionMode,
            required_capabilities: Vec<Capability>,
            initial_variables: Json,
        }
        option {
            requested_start: DateTime<Utc>,
        }
    }

    pub fn build(self) -> JobSubmission {
        JobSubmission {
            workflow_id: self.workflow_id,
            workflow_name: self.workflow_name,
            workflow_json: self.workflow_json,
            priority: self.priority,
            requested_start: self.requested_start,
            max_retries: self.max_retries,
            execution_mode: self.execution_mode,
            required_capabilities: self.required_capabilities,
            initial_variables: self.initial_variables,
        }
    }
}

/// A job row as materialized from `job_queue` (spec.md §3.1 / §6.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub workflow_id: String,
    pub workflow_name: String,
    pub workflow_json: Json,
    pub status: JobStatus,
    pub priority: i32,
    pub visible_after: DateTime<Utc>,
    pub robot_id: Option<RobotId>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    pub progress_percent: Option<i32>,
    pub progress_message: Option<String>,
    pub retry_count: i32,
    pub max_retries: i32,
    pub first_failed_at: Option<DateTime<Utc>>,
    pub execution_mode: ExecutionMode,
    pub required_capabilities: Vec<Capability>,
    pub initial_variables: Json,
    pub result: Option<Json>,
    pub error_message: Option<String>,
    pub error_traceback: Option<String>,
    pub lease_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Set when a checkpointed job is re-enqueued for resumption (§6.3).
    pub start_from_checkpoint: bool,
    pub checkpoint: Option<Checkpoint>,
}

impl Job {
    /// `running` always carries an owning robot and a future lease (invariant).
    pub fn is_leased(&self) -> bool {
        self.status == JobStatus::Running && self.robot_id.is_some()
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            workflow_id: String = "wf-1",
            workflow_name: String = "test workflow",
        }
        set {
            workflow_json: Json = Json::Object(Default::default()),
            status: JobStatus = JobStatus::Pending,
            priority: i32 = 0,
            retry_count: i32 = 0,
            max_retries: i32 = 3,
            execution_mode: ExecutionMode = ExecutionMode::Durable,
            required_capabilities: Vec<Capability> = Vec::new(),
            initial_variables: Json = Json::Object(Default::default()),
            start_from_checkpoint: bool = false,
            progress_percent: Option<i32> = None,
            progress_message: Option<String> = None,
            duration_ms: Option<i64> = None,
            result: Option<Json> = None,
            error_message: Option<String> = None,
            error_traceback: Option<String> = None,
            checkpoint: Option<Checkpoint> = None,
        }
        option {
            robot_id: RobotId = None,
            started_at: DateTime<Utc> = None,
            completed_at: DateTime<Utc> = None,
            first_failed_at: DateTime<Utc> = None,
            lease_expires_at: DateTime<Utc> = None,
        }
        computed {
            id: JobId = JobId::new(),
            visible_after: DateTime<Utc> = Utc::now(),
            created_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
