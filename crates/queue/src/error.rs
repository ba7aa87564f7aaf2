// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the durable job queue (spec.md §4.1, §7).
#[derive(Debug, Error)]
pub enum QueueError {
    /// A connection-layer failure that `with_db_retry` exhausted its budget
    /// retrying; callers should surface this as a fatal audit event.
    #[error("transient database error: {0}")]
    Transient(#[source] sqlx::Error),

    /// A non-transient database failure (bad query, constraint violation).
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("job {0} not found")]
    NotFound(uuid::Uuid),

    /// The caller's `robot_id` does not own the job it tried to mutate.
    #[error("job {job_id} is not owned by robot {robot_id}")]
    OwnershipMismatch { job_id: uuid::Uuid, robot_id: String },

    /// The job is not in the status the requested operation expects.
    #[error("job {job_id} is in status `{actual}`, expected `{expected}`")]
    InvalidTransition { job_id: uuid::Uuid, expected: &'static str, actual: String },

    /// Migration or schema-level failure; process should not continue.
    #[error("fatal queue error: {0}")]
    Fatal(String),
}

/// Whether a raw `sqlx::Error` should be classified transient (connection
/// loss, pool exhaustion, timeout) and thus eligible for [`crate::with_db_retry`].
pub fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed
    )
}
