// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admin/query surface handler (spec.md §4.6 [ADD]): turns a
//! [`oj_protocol::Query`] into a [`oj_protocol::Response`] by reading
//! straight from the queue, the coordinator's fleet registry, and the
//! scheduler's SLA monitor. Framing (how a request reaches this function)
//! is explicitly out of scope per spec.md — an HTTP/UI layer or the `oj`
//! CLI calls this directly against a process that already holds the three
//! handles below.

use oj_coordinator::Coordinator;
use oj_protocol::{Query, QueueStatsSummary, Response, SlaStatus as ProtocolSlaStatus};
use oj_queue::Queue;
use oj_scheduler::Scheduler;
use std::sync::Arc;

/// Everything [`handle_query`] needs: one clone/reference per subsystem the
/// daemon's composition root already owns.
pub struct AdminContext {
    pub queue: Queue,
    pub coordinator: Arc<Coordinator>,
    pub scheduler: Arc<Scheduler>,
}

/// Answer one admin query. Never panics on a missing id; absent entities
/// become `None`/empty-collection responses rather than errors, since a
/// stale id racing a concurrent deletion is an expected, not exceptional,
/// condition for a read-only surface.
pub async fn handle_query(ctx: &AdminContext, query: Query) -> Response {
    match dispatch(ctx, query).await {
        Ok(response) => response,
        Err(error) => Response::Error { message: error.to_string() },
    }
}

async fn dispatch(ctx: &AdminContext, query: Query) -> Result<Response, oj_queue::QueueError> {
    match query {
        Query::QueueStats => {
            let stats = ctx.queue.stats().await?;
            let completions = ctx.queue.completions_last_minute().await?;
            Ok(Response::QueueStats {
                stats: QueueStatsSummary {
                    pending: stats.pending.max(0) as u64,
                    running: stats.running.max(0) as u64,
                    completed: stats.completed.max(0) as u64,
                    failed: stats.failed.max(0) as u64,
                    dlq: stats.dlq.max(0) as u64,
                    throughput_per_min: completions as f64,
                },
            })
        }

        Query::ListDlq { limit } => {
            let entries = ctx.queue.list_dlq(limit as i64).await?;
            Ok(Response::Dlq { entries })
        }

        Query::ReplayDlqEntry { job_id } => {
            let Some(entry) = ctx.queue.find_dlq_by_job(job_id).await? else {
                return Ok(Response::Error { message: format!("no dlq entry for job {job_id}") });
            };
            let new_job_id = ctx.queue.replay_dlq(entry.id).await?;
            Ok(Response::DlqReplayed { new_job_id, replayed_at: chrono::Utc::now() })
        }

        Query::ListRobots => Ok(Response::Robots { robots: ctx.coordinator.registry().snapshot() }),

        Query::GetRobot { robot_id } => Ok(Response::Robot { robot: ctx.coordinator.registry().get_robot(&robot_id).map(Box::new) }),

        Query::ListSchedules => Ok(Response::Schedules { schedules: ctx.queue.list_schedules().await? }),

        Query::GetSchedule { schedule_id } => Ok(Response::Schedule { schedule: ctx.queue.get_schedule(schedule_id).await?.map(Box::new) }),

        Query::GetSlaStatus { schedule_id } => {
            let Some(schedule) = ctx.queue.get_schedule(schedule_id).await? else {
                return Ok(Response::Error { message: format!("no schedule {schedule_id}") });
            };
            let status = ctx.scheduler.sla_status(&schedule).map(|stats| ProtocolSlaStatus {
                success_rate: stats.success_rate,
                p95_duration_ms: stats.p95_ms,
                window_executions: stats.sample_count as u32,
                breached: stats.status == oj_scheduler::SlaStatus::Breached,
            });
            match status {
                Some(status) => Ok(Response::Sla { status }),
                None => Ok(Response::Error { message: format!("schedule {schedule_id} has no sla data yet") }),
            }
        }
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
