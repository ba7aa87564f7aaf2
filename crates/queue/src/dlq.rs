// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dead-letter queue listing and replay (spec.md §3.4, §4.6 admin surface).

use crate::error::QueueError;
use crate::queue::Queue;
use crate::row::parse_execution_mode;
use chrono::{DateTime, Utc};
use oj_core::{Capability, DlqEntry, DlqId, FailureRecord, JobId, JobSubmission};
use serde_json::Value as Json;
use sqlx::types::Json as SqlxJson;
use sqlx::Row;
use uuid::Uuid;

impl Queue {
    /// Most recently dead-lettered entries first.
    pub async fn list_dlq(&self, limit: i64) -> Result<Vec<DlqEntry>, QueueError> {
        let limit = if limit <= 0 { 100 } else { limit };
        let rows = sqlx::query("SELECT * FROM dlq ORDER BY moved_to_dlq_at DESC LIMIT $1").bind(limit).fetch_all(self.pool()).await?;
        rows.iter().map(dlq_entry_from_row).collect()
    }

    /// Look up the DLQ entry for a given original job id, if one exists.
    /// Bridges the admin surface's `ReplayDlqEntry { job_id }` (spec.md
    /// §4.6, keyed the way an operator names the job they want replayed) to
    /// [`Queue::replay_dlq`]'s `dlq_id` primary key.
    pub async fn find_dlq_by_job(&self, job_id: JobId) -> Result<Option<DlqEntry>, QueueError> {
        let row = sqlx::query("SELECT * FROM dlq WHERE job_id = $1").bind(job_id.as_uuid()).fetch_optional(self.pool()).await?;
        row.as_ref().map(dlq_entry_from_row).transpose()
    }

    /// Re-enqueue a dead-lettered entry as a fresh job (spec.md §3.4: replay
    /// produces a new job id, never resurrects the original row). Marks the
    /// DLQ entry replayed so it cannot be replayed twice.
    pub async fn replay_dlq(&self, dlq_id: DlqId) -> Result<JobId, QueueError> {
        let row = sqlx::query("SELECT * FROM dlq WHERE id = $1 FOR UPDATE")
            .bind(dlq_id.as_uuid())
            .fetch_optional(self.pool())
            .await?
            .ok_or(QueueError::NotFound(dlq_id.as_uuid()))?;
        let entry = dlq_entry_from_row(&row)?;
        if entry.replayed {
            return Err(QueueError::InvalidTransition {
                job_id: entry.job_id.as_uuid(),
                expected: "not yet replayed",
                actual: "replayed".to_string(),
            });
        }

        let submission = JobSubmission::builder(entry.workflow_id.clone(), entry.workflow_json.clone())
            .workflow_name(entry.workflow_name.clone())
            .priority(entry.priority)
            .max_retries(entry.max_retries)
            .execution_mode(entry.execution_mode)
            .required_capabilities(entry.required_capabilities.clone())
            .initial_variables(entry.initial_variables.clone())
            .build();
        let new_job_id = self.enqueue(submission).await?;

        sqlx::query("UPDATE dlq SET replayed = TRUE, replayed_at = $2, replayed_as_job_id = $3 WHERE id = $1")
            .bind(dlq_id.as_uuid())
            .bind(Utc::now())
            .bind(new_job_id.as_uuid())
            .execute(self.pool())
            .await?;

        Ok(new_job_id)
    }
}

fn dlq_entry_from_row(row: &sqlx::postgres::PgRow) -> Result<DlqEntry, QueueError> {
    let failure_history: SqlxJson<Vec<FailureRecord>> = row.try_get("failure_history")?;
    let workflow_json: Json = row.try_get("workflow_json")?;
    let initial_variables: Json = row.try_get("initial_variables")?;
    let required_capabilities: SqlxJson<Vec<Capability>> = row.try_get("required_capabilities")?;
    let mode_raw: String = row.try_get("execution_mode")?;
    let replayed_as_job_id: Option<Uuid> = row.try_get("replayed_as_job_id")?;
    let moved_to_dlq_at: DateTime<Utc> = row.try_get("moved_to_dlq_at")?;
    Ok(DlqEntry {
        id: DlqId::from_uuid(row.try_get("id")?),
        job_id: JobId::from_uuid(row.try_get("job_id")?),
        workflow_id: row.try_get("workflow_id")?,
        workflow_name: row.try_get("workflow_name")?,
        workflow_json,
        priority: row.try_get("priority")?,
        max_retries: row.try_get("max_retries")?,
        execution_mode: parse_execution_mode(&mode_raw)?,
        required_capabilities: required_capabilities.0,
        initial_variables,
        failure_history: failure_history.0,
        moved_to_dlq_at,
        replayed: row.try_get("replayed")?,
        replayed_at: row.try_get("replayed_at")?,
        replayed_as_job_id: replayed_as_job_id.map(JobId::from_uuid),
    })
}

#[cfg(test)]
#[path = "dlq_tests.rs"]
mod tests;
