// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recovery Manager: subscribes to the coordinator's `robot_failed` feed and
//! decides, per claimed job, whether to resume from checkpoint, retry with
//! backoff, or dead-letter (spec.md §4.4). The decision tree itself lives in
//! [`oj_queue::Queue::recover_claim`] — this crate is the orchestration and
//! audit layer around it, not a second copy of the policy.

use crate::error::RecoveryError;
use chrono::{DateTime, Utc};
use oj_coordinator::{RobotFailedEvent, RobotFailedReason, RobotFailedReceiver};
use oj_core::{AuditEntity, JobId, RobotId};
use oj_queue::{FailOutcome, Queue};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// What became of one orphaned job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecoveryDecision {
    pub job_id: JobId,
    pub outcome: FailOutcome,
}

/// The full result of recovering one robot's claimed work, mirrored into
/// the audit log as a single `recovery_event`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryReport {
    pub robot_id: RobotId,
    pub reason: RobotFailedReason,
    pub decisions: Vec<JobRecoveryDecision>,
    pub occurred_at: DateTime<Utc>,
}

pub struct RecoveryManager {
    queue: Queue,
    shutdown: CancellationToken,
}

impl RecoveryManager {
    pub fn new(queue: Queue) -> Self {
        Self { queue, shutdown: CancellationToken::new() }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Drains `robot_failed` until shutdown is requested or the channel
    /// closes (coordinator gone). An independent task, same cancellation
    /// convention as the coordinator's heartbeat sweep.
    pub async fn run(&self, mut robot_failed: RobotFailedReceiver) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("recovery manager shutting down");
                    return;
                }
                event = robot_failed.recv() => {
                    match event {
                        Ok(event) => {
                            if let Err(error) = self.handle_event(event).await {
                                tracing::warn!(%error, "recovery pass failed");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "recovery manager lagged behind robot_failed events");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::warn!("robot_failed channel closed; recovery manager exiting");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Recover every job a failed robot was holding, per spec.md §4.4's
    /// policy, and append the audit trail entry for it.
    pub async fn handle_event(&self, event: RobotFailedEvent) -> Result<RecoveryReport, RecoveryError> {
        recover_robot(&self.queue, &event.robot_id, &event.orphaned_jobs, event.reason, event.occurred_at).await
    }

    /// Ops-triggered recovery: look up whatever the robot currently holds
    /// (rather than trusting a caller-supplied job list) and recover it
    /// (spec.md §4.4 `manually_recover_robot`).
    pub async fn manually_recover_robot(
        &self,
        robot_id: &RobotId,
        requested_by: impl Into<String>,
    ) -> Result<RecoveryReport, RecoveryError> {
        let orphaned = self.queue.running_job_ids(robot_id).await?;
        let reason = RobotFailedReason::ManualRecovery { requested_by: requested_by.into() };
        recover_robot(&self.queue, robot_id, &orphaned, reason, Utc::now()).await
    }
}

async fn recover_robot(
    queue: &Queue,
    robot_id: &RobotId,
    orphaned_jobs: &[JobId],
    reason: RobotFailedReason,
    occurred_at: DateTime<Utc>,
) -> Result<RecoveryReport, RecoveryError> {
    let mut decisions = Vec::with_capacity(orphaned_jobs.len());
    for &job_id in orphaned_jobs {
        let outcome = queue.recover_claim(job_id, robot_id).await?;
        decisions.push(JobRecoveryDecision { job_id, outcome });
    }

    let detail = crate::detail::recovery_detail(&reason, &decisions);
    queue.append_audit(AuditEntity::Robot, robot_id.as_str(), "recovery_event", "recovery-manager", detail).await?;

    Ok(RecoveryReport { robot_id: robot_id.clone(), reason, decisions, occurred_at })
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
