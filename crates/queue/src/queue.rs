// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable job queue's state-transition operations (spec.md §4.1).
//!
//! Every operation here is either a single `UPDATE ... RETURNING` statement
//! (the mandatory pattern for `claim`, forbidding a separate SELECT-then-UPDATE
//! that would admit a TOCTOU race) or a short transaction that locks the rows
//! it touches with `FOR UPDATE SKIP LOCKED` before deciding their fate.

use crate::error::QueueError;
use crate::retry::with_db_retry;
use crate::row::{
    execution_mode_to_str, failure_record_json, job_from_row, job_status_to_str,
    parse_job_status,
};
use chrono::{DateTime, Utc};
use oj_core::{BackoffPolicy, Checkpoint, Job, JobId, JobStatus, JobSubmission, QueueConfig, RobotId};
use serde_json::Value as Json;
use sqlx::types::Json as SqlxJson;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// A job handed to a robot by [`Queue::claim`]. Distinct alias from [`Job`]
/// for call-site clarity; carries the same full row.
pub type ClaimedJob = Job;

/// Outcome of a failure-handling decision (`fail`, `requeue_stale`,
/// `recover_claim`): which terminal bucket the job landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailOutcome {
    pub moved_to_dlq: bool,
    pub will_retry: bool,
    /// Set when the job was requeued for checkpoint resumption rather than
    /// a plain retry (spec.md §6.3, §4.4 policy step 1).
    pub resumed: bool,
}

/// The durable job queue. One instance owns the Postgres pool for the life
/// of the daemon process; constructed once at startup and passed through
/// the composition root, never a global.
#[derive(Clone)]
pub struct Queue {
    pool: PgPool,
    config: QueueConfig,
}

impl Queue {
    pub fn new(pool: PgPool, config: QueueConfig) -> Self {
        Self { pool, config }
    }

    /// Connect to `database_url`, running pending migrations, and return a
    /// ready-to-use queue. The daemon's composition root calls this once at
    /// startup; tests use [`crate::test_support::connect_or_skip`] instead.
    pub async fn connect(database_url: &str, config: QueueConfig) -> Result<Self, QueueError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(QueueError::Db)?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| QueueError::Fatal(e.to_string()))?;
        Ok(Self::new(pool, config))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_retries: self.config.max_retries,
            base_delay_ms: self.config.base_delay_ms,
            multiplier: self.config.multiplier,
            max_delay_ms: self.config.max_delay_ms,
            jitter: self.config.jitter,
        }
    }

    /// Insert a new job row with `status=pending` (spec.md §4.1 `enqueue`).
    pub async fn enqueue(&self, submission: JobSubmission) -> Result<JobId, QueueError> {
        let policy = self.backoff();
        with_db_retry(&policy, || async {
            let id = Uuid::new_v4();
            let now = Utc::now();
            let visible_after = submission.requested_start.map(|t| t.max(now)).unwrap_or(now);
            let required = SqlxJson(submission.required_capabilities.clone());

            sqlx::query(
                r#"
                INSERT INTO job_queue
                    (id, workflow_id, workflow_name, workflow_json, status, priority,
                     visible_after, max_retries, execution_mode, required_capabilities,
                     initial_variables, created_at)
                VALUES
                    ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(id)
            .bind(&submission.workflow_id)
            .bind(&submission.workflow_name)
            .bind(&submission.workflow_json)
            .bind(submission.priority)
            .bind(visible_after)
            .bind(submission.max_retries)
            .bind(execution_mode_to_str(submission.execution_mode))
            .bind(&required)
            .bind(&submission.initial_variables)
            .bind(now)
            .execute(&self.pool)
            .await?;

            sqlx::query("SELECT pg_notify($1, $2)")
                .bind(&self.config.notify_channel_name)
                .bind(id.to_string())
                .execute(&self.pool)
                .await?;

            Ok(JobId::from_uuid(id))
        })
        .await
    }

    /// Atomically claim up to `limit` eligible jobs for `robot_id`
    /// (spec.md §4.1 `claim`). The `UPDATE ... FROM (SELECT ... FOR UPDATE
    /// SKIP LOCKED) RETURNING` shape is mandatory: a separate SELECT then
    /// UPDATE would let two robots both see the same row as pending.
    pub async fn claim(&self, robot_id: &RobotId, limit: i64) -> Result<Vec<ClaimedJob>, QueueError> {
        let policy = self.backoff();
        let visibility_timeout = self.config.visibility_timeout_secs as f64;
        let rows = with_db_retry(&policy, || async {
            sqlx::query(
                r#"
                UPDATE job_queue
                SET status = 'running',
                    robot_id = $1,
                    started_at = now(),
                    lease_expires_at = now() + ($2 * interval '1 second')
                WHERE id IN (
                    SELECT id FROM job_queue
                    WHERE status = 'pending' AND visible_after <= now()
                    ORDER BY priority DESC, created_at ASC
                    LIMIT $3
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING *
                "#,
            )
            .bind(robot_id.as_str())
            .bind(visibility_timeout)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        })
        .await?;

        rows.iter().map(job_from_row).collect()
    }

    /// Extend a held lease; returns whether the row matched (spec.md §4.1
    /// `extend_lease`). Also the implicit heartbeat applied on `job_progress`.
    pub async fn extend_lease(
        &self,
        job_id: JobId,
        robot_id: &RobotId,
        seconds: i64,
    ) -> Result<bool, QueueError> {
        let policy = self.backoff();
        with_db_retry(&policy, || async {
            let result = sqlx::query(
                r#"
                UPDATE job_queue
                SET lease_expires_at = now() + ($3 * interval '1 second')
                WHERE id = $1 AND robot_id = $2 AND status = 'running'
                "#,
            )
            .bind(job_id.as_uuid())
            .bind(robot_id.as_str())
            .bind(seconds)
            .execute(&self.pool)
            .await?;

            Ok(result.rows_affected() == 1)
        })
        .await
    }

    /// Record mid-run progress; an implicit lease refresh (spec.md §4.3).
    pub async fn record_progress(
        &self,
        job_id: JobId,
        robot_id: &RobotId,
        progress_percent: i32,
        progress_message: Option<&str>,
    ) -> Result<bool, QueueError> {
        let policy = self.backoff();
        let visibility_timeout = self.config.visibility_timeout_secs as f64;
        with_db_retry(&policy, || async {
            let result = sqlx::query(
                r#"
                UPDATE job_queue
                SET progress_percent = $3,
                    progress_message = $4,
                    lease_expires_at = now() + ($5 * interval '1 second')
                WHERE id = $1 AND robot_id = $2 AND status = 'running'
                "#,
            )
            .bind(job_id.as_uuid())
            .bind(robot_id.as_str())
            .bind(progress_percent)
            .bind(progress_message)
            .bind(visibility_timeout)
            .execute(&self.pool)
            .await?;

            Ok(result.rows_affected() == 1)
        })
        .await
    }

    /// Persist the robot's latest durable checkpoint for a job (spec.md §6.3).
    pub async fn save_checkpoint(
        &self,
        job_id: JobId,
        robot_id: &RobotId,
        checkpoint: Checkpoint,
    ) -> Result<bool, QueueError> {
        let policy = self.backoff();
        with_db_retry(&policy, || async {
            let payload = SqlxJson(&checkpoint);
            let result = sqlx::query(
                "UPDATE job_queue SET checkpoint = $3 WHERE id = $1 AND robot_id = $2 AND status = 'running'",
            )
            .bind(job_id.as_uuid())
            .bind(robot_id.as_str())
            .bind(&payload)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() == 1)
        })
        .await
    }

    /// Mark a job completed (spec.md §4.1 `complete`). Fails if the row is
    /// not `running` or is owned by a different robot.
    pub async fn complete(&self, job_id: JobId, robot_id: &RobotId, result: Json) -> Result<(), QueueError> {
        let policy = self.backoff();
        let row = with_db_retry(&policy, || async {
            sqlx::query(
                r#"
                UPDATE job_queue
                SET status = 'completed',
                    completed_at = now(),
                    duration_ms = EXTRACT(EPOCH FROM (now() - started_at)) * 1000,
                    result = $3
                WHERE id = $1 AND robot_id = $2 AND status = 'running'
                RETURNING id
                "#,
            )
            .bind(job_id.as_uuid())
            .bind(robot_id.as_str())
            .bind(&result)
            .fetch_optional(&self.pool)
            .await
        })
        .await?;

        match row {
            Some(_) => Ok(()),
            None => Err(self.classify_mutation_miss(job_id, robot_id).await),
        }
    }

    /// Remap a plain "no row matched" error into the precise classification
    /// the caller needs: not found, wrong owner, or wrong status.
    async fn classify_mutation_miss(&self, job_id: JobId, robot_id: &RobotId) -> QueueError {
        let row = sqlx::query("SELECT robot_id, status FROM job_queue WHERE id = $1")
            .bind(job_id.as_uuid())
            .fetch_optional(&self.pool)
            .await;
        match row {
            Ok(Some(row)) => {
                let owner: Option<String> = row.try_get("robot_id").unwrap_or(None);
                let status: String = row.try_get("status").unwrap_or_default();
                if owner.as_deref() != Some(robot_id.as_str()) {
                    QueueError::OwnershipMismatch { job_id: job_id.as_uuid(), robot_id: robot_id.to_string() }
                } else {
                    QueueError::InvalidTransition { job_id: job_id.as_uuid(), expected: "running", actual: status }
                }
            }
            Ok(None) => QueueError::NotFound(job_id.as_uuid()),
            Err(err) => QueueError::Db(err),
        }
    }

    /// Record a failure; decides retry-with-backoff vs. dead-letter per
    /// `max_retries` (spec.md §4.1 `fail`).
    pub async fn fail(
        &self,
        job_id: JobId,
        robot_id: &RobotId,
        error_message: &str,
        error_traceback: Option<&str>,
    ) -> Result<FailOutcome, QueueError> {
        let mut tx = self.pool.begin().await.map_err(QueueError::Db)?;
        let row = sqlx::query("SELECT * FROM job_queue WHERE id = $1 FOR UPDATE")
            .bind(job_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(QueueError::NotFound(job_id.as_uuid()))?;
        let job = job_from_row(&row)?;

        if job.robot_id.as_ref() != Some(robot_id) {
            return Err(QueueError::OwnershipMismatch { job_id: job_id.as_uuid(), robot_id: robot_id.to_string() });
        }
        if job.status != JobStatus::Running {
            return Err(QueueError::InvalidTransition {
                job_id: job_id.as_uuid(),
                expected: "running",
                actual: job_status_to_str(job.status).to_string(),
            });
        }

        let outcome = self
            .apply_failure(&mut tx, &job, Some(robot_id), error_message, error_traceback, false)
            .await?;
        tx.commit().await.map_err(QueueError::Db)?;
        Ok(outcome)
    }

    /// Release a claimed job back to `pending` without touching
    /// `retry_count` (graceful shutdown / planned release, spec.md §4.1
    /// `release`).
    pub async fn release(&self, job_id: JobId) -> Result<(), QueueError> {
        let policy = self.backoff();
        with_db_retry(&policy, || async {
            sqlx::query(
                r#"
                UPDATE job_queue
                SET status = 'pending', robot_id = NULL, lease_expires_at = NULL, started_at = NULL
                WHERE id = $1 AND status = 'running'
                "#,
            )
            .bind(job_id.as_uuid())
            .execute(&self.pool)
            .await?;

            sqlx::query("SELECT pg_notify($1, $2)")
                .bind(&self.config.notify_channel_name)
                .bind(job_id.as_uuid().to_string())
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    /// Explicit cancellation from `pending` or `running` (spec.md §5).
    pub async fn cancel(&self, job_id: JobId) -> Result<bool, QueueError> {
        let policy = self.backoff();
        with_db_retry(&policy, || async {
            let result = sqlx::query(
                "UPDATE job_queue SET status = 'cancelled', completed_at = now() WHERE id = $1 AND status IN ('pending', 'running')",
            )
            .bind(job_id.as_uuid())
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() == 1)
        })
        .await
    }

    /// Reclaim jobs whose lease has silently expired (spec.md §4.1
    /// `requeue_stale`). Idempotent: a job already moved on by `complete`
    /// or `fail` no longer matches the `running AND lease_expires_at < now()`
    /// predicate, so re-invoking does nothing to it.
    pub async fn requeue_stale(&self) -> Result<Vec<FailOutcome>, QueueError> {
        let mut tx = self.pool.begin().await.map_err(QueueError::Db)?;
        let rows = sqlx::query(
            "SELECT * FROM job_queue WHERE status = 'running' AND lease_expires_at < now() FOR UPDATE SKIP LOCKED",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in &rows {
            let job = job_from_row(row)?;
            let outcome = self
                .apply_failure(&mut tx, &job, job.robot_id.as_ref(), "lease expired", None, true)
                .await?;
            outcomes.push(outcome);
        }
        tx.commit().await.map_err(QueueError::Db)?;
        Ok(outcomes)
    }

    /// Apply the recovery manager's per-job policy after a robot failure
    /// (spec.md §4.4): resume from checkpoint, retry with backoff, or DLQ.
    /// Shares the decision tree with `fail`/`requeue_stale` so every path
    /// that removes a job from `running` goes through one place.
    pub async fn recover_claim(&self, job_id: JobId, robot_id: &RobotId) -> Result<FailOutcome, QueueError> {
        let mut tx = self.pool.begin().await.map_err(QueueError::Db)?;
        let row = sqlx::query("SELECT * FROM job_queue WHERE id = $1 AND robot_id = $2 AND status = 'running' FOR UPDATE")
            .bind(job_id.as_uuid())
            .bind(robot_id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            // Already reclaimed by requeue_stale or completed/failed by the
            // robot before the disconnect was observed — idempotent no-op.
            tx.commit().await.map_err(QueueError::Db)?;
            return Ok(FailOutcome { moved_to_dlq: false, will_retry: false, resumed: false });
        };
        let job = job_from_row(&row)?;
        let outcome = self
            .apply_failure(&mut tx, &job, Some(robot_id), "robot failure", None, true)
            .await?;
        tx.commit().await.map_err(QueueError::Db)?;
        Ok(outcome)
    }

    /// Shared decision tree: resume-from-checkpoint, retry-with-backoff, or
    /// dead-letter. `prefer_checkpoint` distinguishes `fail()` (an explicit
    /// robot-reported failure, never checkpoint-resumable by definition)
    /// from lease-expiry/recovery paths, which honor a resumable checkpoint.
    #[allow(clippy::too_many_arguments)]
    async fn apply_failure(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job: &Job,
        robot_id: Option<&RobotId>,
        error_message: &str,
        error_traceback: Option<&str>,
        prefer_checkpoint: bool,
    ) -> Result<FailOutcome, QueueError> {
        let now = Utc::now();

        if prefer_checkpoint {
            if let Some(checkpoint) = &job.checkpoint {
                if checkpoint.resumable {
                    let delay = self.backoff().delay(0);
                    sqlx::query(
                        r#"
                        UPDATE job_queue
                        SET status = 'pending',
                            robot_id = NULL,
                            lease_expires_at = NULL,
                            started_at = NULL,
                            visible_after = $2,
                            start_from_checkpoint = TRUE
                        WHERE id = $1
                        "#,
                    )
                    .bind(job.id.as_uuid())
                    .bind(now + chrono::Duration::milliseconds(delay.as_millis() as i64))
                    .execute(&mut **tx)
                    .await?;
                    return Ok(FailOutcome { moved_to_dlq: false, will_retry: true, resumed: true });
                }
            }
        }

        let policy = self.backoff();
        let next_retry_count = job.retry_count + 1;
        if policy.should_retry(job.retry_count) {
            let delay = policy.delay(job.retry_count);
            let first_failed_at = job.first_failed_at.unwrap_or(now);
            sqlx::query(
                r#"
                UPDATE job_queue
                SET status = 'pending',
                    robot_id = NULL,
                    lease_expires_at = NULL,
                    started_at = NULL,
                    visible_after = $2,
                    retry_count = $3,
                    first_failed_at = $4,
                    error_message = $5,
                    error_traceback = $6,
                    start_from_checkpoint = FALSE,
                    checkpoint = NULL
                WHERE id = $1
                "#,
            )
            .bind(job.id.as_uuid())
            .bind(now + chrono::Duration::milliseconds(delay.as_millis() as i64))
            .bind(next_retry_count)
            .bind(first_failed_at)
            .bind(error_message)
            .bind(error_traceback)
            .execute(&mut **tx)
            .await?;
            Ok(FailOutcome { moved_to_dlq: false, will_retry: true, resumed: false })
        } else {
            self.move_to_dlq(tx, job, robot_id, next_retry_count, error_message, error_traceback, now).await?;
            Ok(FailOutcome { moved_to_dlq: true, will_retry: false, resumed: false })
        }
    }

    /// `attempt` is the true 1-based count of failures seen so far (recorded
    /// verbatim in the DLQ's `failure_history`); the job row's own
    /// `retry_count` column is clamped to `max_retries` so the terminal DLQ
    /// row never violates the `retry_count ≤ max_retries` invariant
    /// (spec.md §3.1, Testable Property 3) even though more attempts than
    /// `max_retries` may have been observed.
    #[allow(clippy::too_many_arguments)]
    async fn move_to_dlq(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        job: &Job,
        robot_id: Option<&RobotId>,
        attempt: i32,
        error_message: &str,
        error_traceback: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let stored_retry_count = attempt.min(job.max_retries);
        let new_record = failure_record_json(attempt, robot_id, error_message, error_traceback, at);
        let history = sqlx::query_scalar::<_, Json>("SELECT failure_history FROM dlq WHERE job_id = $1")
            .bind(job.id.as_uuid())
            .fetch_optional(&mut **tx)
            .await?;
        let mut history = history.unwrap_or_else(|| Json::Array(Vec::new()));
        if let Json::Array(list) = &mut history {
            list.push(new_record);
        }

        sqlx::query(
            r#"
            INSERT INTO dlq (
                id, job_id, workflow_id, workflow_name, workflow_json, priority,
                max_retries, execution_mode, required_capabilities, initial_variables,
                failure_history, moved_to_dlq_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (job_id) DO UPDATE SET failure_history = EXCLUDED.failure_history
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(job.id.as_uuid())
        .bind(&job.workflow_id)
        .bind(&job.workflow_name)
        .bind(&job.workflow_json)
        .bind(job.priority)
        .bind(job.max_retries)
        .bind(execution_mode_to_str(job.execution_mode))
        .bind(SqlxJson(&job.required_capabilities))
        .bind(&job.initial_variables)
        .bind(&history)
        .bind(at)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE job_queue
            SET status = 'dlq',
                robot_id = NULL,
                lease_expires_at = NULL,
                retry_count = $2,
                error_message = $3,
                error_traceback = $4,
                completed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(stored_retry_count)
        .bind(error_message)
        .bind(error_traceback)
        .bind(at)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
