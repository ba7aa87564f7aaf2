// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job dispatch: runs the assignment engine, sends `job_assign`, and waits
//! for `job_accept`/`job_reject`. On reject or timeout, releases the job and
//! retries assignment excluding the robot that just failed it
//! (spec.md §4.3 assignment flow).

use crate::server::Coordinator;
use chrono::Utc;
use oj_assignment::AssignmentRequest;
use oj_core::{Job, RobotId};
use oj_protocol::{Envelope, Message};
use std::collections::HashSet;
use std::time::Duration;

use crate::error::CoordinatorError;

pub async fn dispatch_job(coordinator: &Coordinator, job: &Job, request: AssignmentRequest) -> Result<RobotId, CoordinatorError> {
    let mut excluded: HashSet<RobotId> = HashSet::new();

    loop {
        let candidates: Vec<oj_core::Robot> =
            coordinator.registry.snapshot().into_iter().filter(|r| !excluded.contains(&r.id)).collect();

        let assignment = {
            let affinity = coordinator.affinity.lock();
            oj_assignment::assign(&request, &candidates, &coordinator.assignment_config, &affinity, Utc::now())?
        };
        let robot_id = assignment.robot_id;

        if !coordinator.registry.assign_job(&robot_id, job.id) {
            // Lost a race with another dispatch or a disconnect between the
            // snapshot and now; try the next-best candidate.
            excluded.insert(robot_id);
            continue;
        }

        let correlation_id = nanoid::nanoid!();
        let reply = coordinator.pending.begin(correlation_id.clone());
        let envelope = Envelope::with_correlation_id(
            Message::JobAssign { job_id: job.id, workflow_json: job.workflow_json.clone(), start_from_checkpoint: job.start_from_checkpoint },
            correlation_id.clone(),
        );

        if !coordinator.registry.send(&robot_id, envelope) {
            coordinator.pending.cancel(&correlation_id);
            coordinator.registry.release_job(&robot_id, &job.id);
            excluded.insert(robot_id);
            continue;
        }

        let timeout = Duration::from_secs(coordinator.config.connection_timeout_secs);
        match tokio::time::timeout(timeout, reply).await {
            Ok(Ok(Message::JobAccept { .. })) => {
                coordinator.affinity.lock().record(&request.workflow_id, &robot_id, Utc::now());
                return Ok(robot_id);
            }
            Ok(Ok(Message::JobReject { reason, .. })) => {
                tracing::info!(%robot_id, %reason, "robot rejected assignment");
                coordinator.registry.release_job(&robot_id, &job.id);
                coordinator.queue.release(job.id).await?;
                excluded.insert(robot_id);
            }
            Ok(Err(_)) => {
                // Reply sender dropped (connection task exited) without resolving.
                coordinator.registry.release_job(&robot_id, &job.id);
                coordinator.queue.release(job.id).await?;
                excluded.insert(robot_id);
            }
            Ok(Ok(_)) | Err(_) => {
                tracing::warn!(%robot_id, "assignment timed out waiting for job_accept/job_reject");
                coordinator.pending.cancel(&correlation_id);
                coordinator.registry.release_job(&robot_id, &job.id);
                coordinator.queue.release(job.id).await?;
                excluded.insert(robot_id);
            }
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
