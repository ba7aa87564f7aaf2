// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queue introspection: `stats()` and `peek()` (spec.md §4.1),
//! the internal surface the out-of-scope admin/UI layer queries through.

use crate::error::QueueError;
use crate::queue::Queue;
use crate::row::job_from_row;
use chrono::Duration as ChronoDuration;
use oj_core::{Job, JobId, JobStatus, RobotId};
use sqlx::Row;

/// Queue depth snapshot (spec.md §4.1 `stats`).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueueStats {
    pub pending: i64,
    pub running: i64,
    pub completed: i64,
    pub failed: i64,
    pub cancelled: i64,
    pub dlq: i64,
    /// Age, in seconds, of the oldest still-pending job; `None` if the
    /// queue currently holds no pending work.
    pub oldest_pending_age_secs: Option<i64>,
}

/// Filter accepted by [`Queue::peek`] for UI/debugging listings.
#[derive(Debug, Clone, Default)]
pub struct PeekFilter {
    pub status: Option<JobStatus>,
    pub workflow_id: Option<String>,
    pub limit: i64,
}

impl Queue {
    /// Queue-wide depth and age stats (spec.md §4.1 `stats`).
    pub async fn stats(&self) -> Result<QueueStats, QueueError> {
        let mut stats = QueueStats::default();
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM job_queue GROUP BY status")
            .fetch_all(self.pool())
            .await?;
        for row in rows {
            let status: String = row.try_get("status")?;
            let n: i64 = row.try_get("n")?;
            match status.as_str() {
                "pending" => stats.pending = n,
                "running" => stats.running = n,
                "completed" => stats.completed = n,
                "failed" => stats.failed = n,
                "cancelled" => stats.cancelled = n,
                "dlq" => stats.dlq = n,
                _ => {}
            }
        }

        let oldest: Option<chrono::DateTime<chrono::Utc>> =
            sqlx::query_scalar("SELECT MIN(created_at) FROM job_queue WHERE status = 'pending'")
                .fetch_one(self.pool())
                .await?;
        stats.oldest_pending_age_secs = oldest.map(|t| {
            let age: ChronoDuration = chrono::Utc::now() - t;
            age.num_seconds().max(0)
        });

        Ok(stats)
    }

    /// Pending job depth broken down by priority bucket (spec.md §4.1 `stats`
    /// `depth_by_priority`).
    pub async fn depth_by_priority(&self) -> Result<Vec<(i32, i64)>, QueueError> {
        let rows = sqlx::query(
            "SELECT priority, COUNT(*) AS n FROM job_queue WHERE status = 'pending' GROUP BY priority ORDER BY priority DESC",
        )
        .fetch_all(self.pool())
        .await?;
        rows.iter()
            .map(|row| Ok((row.try_get::<i32, _>("priority")?, row.try_get::<i64, _>("n")?)))
            .collect()
    }

    /// List jobs matching `filter`, most recently created first (spec.md
    /// §4.1 `peek`).
    pub async fn peek(&self, filter: &PeekFilter) -> Result<Vec<Job>, QueueError> {
        let limit = if filter.limit <= 0 { 100 } else { filter.limit };
        let status_str = filter.status.map(crate::row::job_status_to_str);
        let rows = sqlx::query(
            r#"
            SELECT * FROM job_queue
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR workflow_id = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(status_str)
        .bind(filter.workflow_id.as_deref())
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(job_from_row).collect()
    }

    /// Ids of jobs currently claimed by `robot_id` (spec.md §4.4 manual
    /// recovery — the admin surface's only way to learn what a robot was
    /// holding before asking recovery to act on it).
    pub async fn running_job_ids(&self, robot_id: &RobotId) -> Result<Vec<JobId>, QueueError> {
        let rows = sqlx::query("SELECT id FROM job_queue WHERE robot_id = $1 AND status = 'running'")
            .bind(robot_id.as_str())
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(|row| Ok(JobId::from_uuid(row.try_get("id")?))).collect()
    }

    /// A single job by id, or `None` if it doesn't exist. Used by the
    /// scheduler to check whether a previously-dispatched run has reached a
    /// terminal status yet (spec.md §4.5 concurrency policy).
    pub async fn get_job(&self, job_id: JobId) -> Result<Option<Job>, QueueError> {
        let row = sqlx::query("SELECT * FROM job_queue WHERE id = $1").bind(job_id.as_uuid()).fetch_optional(self.pool()).await?;
        row.as_ref().map(job_from_row).transpose()
    }

    /// Completions in the trailing 60 seconds, for the admin surface's
    /// `QueueStats.throughput_per_min` (spec.md §4.6).
    pub async fn completions_last_minute(&self) -> Result<i64, QueueError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM job_queue WHERE status = 'completed' AND completed_at > now() - interval '60 seconds'",
        )
        .fetch_one(self.pool())
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
