// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mapping between `job_queue` rows and [`oj_core::Job`].
//!
//! Status and execution-mode columns are plain `TEXT`; capabilities and the
//! checkpoint are `JSONB`. Parsing lives here rather than on the domain
//! types themselves, since the DB's on-the-wire string constants are this
//! crate's concern, not `oj-core`'s.

use crate::error::QueueError;
use chrono::{DateTime, Utc};
use oj_core::{Capability, Checkpoint, ExecutionMode, Job, JobId, JobStatus, RobotId};
use serde_json::Value as Json;
use sqlx::postgres::PgRow;
use sqlx::types::Json as SqlxJson;
use sqlx::Row;

pub(crate) fn job_status_to_str(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Running => "running",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "failed",
        JobStatus::Cancelled => "cancelled",
        JobStatus::Dlq => "dlq",
    }
}

pub(crate) fn parse_job_status(raw: &str) -> Result<JobStatus, QueueError> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        "cancelled" => Ok(JobStatus::Cancelled),
        "dlq" => Ok(JobStatus::Dlq),
        other => Err(QueueError::Fatal(format!("unrecognized job status `{other}` in row"))),
    }
}

pub(crate) fn execution_mode_to_str(mode: ExecutionMode) -> &'static str {
    match mode {
        ExecutionMode::Durable => "durable",
        ExecutionMode::Realtime => "realtime",
    }
}

pub(crate) fn parse_execution_mode(raw: &str) -> Result<ExecutionMode, QueueError> {
    match raw {
        "durable" => Ok(ExecutionMode::Durable),
        "realtime" => Ok(ExecutionMode::Realtime),
        other => Err(QueueError::Fatal(format!("unrecognized execution mode `{other}` in row"))),
    }
}

/// Convert a `job_queue` row into the domain [`Job`]. Expects the row to
/// have been fetched with `SELECT *` (or an explicit column list matching
/// the migration's column order) from `0001_init.sql`.
pub(crate) fn job_from_row(row: &PgRow) -> Result<Job, QueueError> {
    let status_raw: String = row.try_get("status")?;
    let mode_raw: String = row.try_get("execution_mode")?;
    let required_capabilities: SqlxJson<Vec<Capability>> = row.try_get("required_capabilities")?;
    let checkpoint: Option<SqlxJson<Checkpoint>> = row.try_get("checkpoint")?;
    let robot_id: Option<String> = row.try_get("robot_id")?;
    let initial_variables: Json = row.try_get("initial_variables")?;
    let workflow_json: Json = row.try_get("workflow_json")?;
    let result: Option<Json> = row.try_get("result")?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get("id")?),
        workflow_id: row.try_get("workflow_id")?,
        workflow_name: row.try_get("workflow_name")?,
        workflow_json,
        status: parse_job_status(&status_raw)?,
        priority: row.try_get("priority")?,
        visible_after: row.try_get("visible_after")?,
        robot_id: robot_id.map(RobotId::new),
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        duration_ms: row.try_get("duration_ms")?,
        progress_percent: row.try_get("progress_percent")?,
        progress_message: row.try_get("progress_message")?,
        retry_count: row.try_get("retry_count")?,
        max_retries: row.try_get("max_retries")?,
        first_failed_at: row.try_get("first_failed_at")?,
        execution_mode: parse_execution_mode(&mode_raw)?,
        required_capabilities: required_capabilities.0,
        initial_variables,
        result,
        error_message: row.try_get("error_message")?,
        error_traceback: row.try_get("error_traceback")?,
        lease_expires_at: row.try_get("lease_expires_at")?,
        created_at: row.try_get("created_at")?,
        start_from_checkpoint: row.try_get("start_from_checkpoint")?,
        checkpoint: checkpoint.map(|j| j.0),
    })
}

/// A single `failure_history` entry as stored in `dlq.failure_history` JSONB.
pub(crate) fn failure_record_json(
    attempt: i32,
    robot_id: Option<&RobotId>,
    error_message: &str,
    error_traceback: Option<&str>,
    at: DateTime<Utc>,
) -> Json {
    serde_json::json!({
        "attempt": attempt,
        "robot_id": robot_id.map(|r| r.as_str().to_string()),
        "error_message": error_message,
        "error_traceback": error_traceback,
        "failed_at": at.to_rfc3339(),
    })
}
