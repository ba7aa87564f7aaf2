// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection-layer retry wrapper for transient I/O (spec.md §7).

use crate::error::{is_transient, QueueError};
use oj_core::BackoffPolicy;
use std::future::Future;

/// Retry `op` with bounded exponential backoff while it fails with a
/// transient `sqlx::Error`. Non-transient errors and retry exhaustion are
/// both surfaced immediately — the Queue must never silently lose a
/// transition (spec.md §4.1).
pub async fn with_db_retry<T, F, Fut>(policy: &BackoffPolicy, mut op: F) -> Result<T, QueueError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if is_transient(&err) && policy.should_retry(attempt) => {
                tracing::warn!(attempt, error = %err, "transient db error, retrying");
                tokio::time::sleep(policy.delay(attempt)).await;
                attempt += 1;
            }
            Err(err) if is_transient(&err) => {
                tracing::error!(attempt, error = %err, "transient db error, retries exhausted");
                return Err(QueueError::Transient(err));
            }
            Err(err) => return Err(QueueError::Db(err)),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
