// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Missed-heartbeat detector: an independent task that periodically sweeps
//! the registry for robots gone quiet past `heartbeat_timeout_secs`
//! (spec.md §4.3 connection lifecycle, `Unhealthy` transition).

use crate::events::{RobotFailedReason, RobotFailedSender};
use crate::registry::FleetRegistry;
use crate::server::Coordinator;
use std::sync::Arc;
use std::time::Duration;

pub(crate) async fn run_heartbeat_sweep(coordinator: Arc<Coordinator>) {
    let interval_secs = coordinator.config.heartbeat_interval_secs.max(1);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    let shutdown = coordinator.shutdown.clone();
    let timeout_secs = coordinator.config.heartbeat_timeout_secs;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("heartbeat sweep shutting down");
                return;
            }
            _ = ticker.tick() => {
                sweep_once(&coordinator.registry, &coordinator.robot_failed_tx, timeout_secs, chrono::Utc::now());
            }
        }
    }
}

/// Pure(-ish) sweep step — no `Coordinator` dependency so it is testable
/// without a live database backing a `Queue`.
fn sweep_once(registry: &FleetRegistry, robot_failed_tx: &RobotFailedSender, timeout_secs: u64, now: chrono::DateTime<chrono::Utc>) {
    let stale = registry.stale_robots(now, timeout_secs);
    for robot_id in stale {
        let orphaned_jobs = registry.get_robot(&robot_id).map(|r| r.current_jobs.into_iter().collect()).unwrap_or_default();
        registry.remove(&robot_id);
        tracing::warn!(%robot_id, "robot missed heartbeat deadline, marking failed");
        let _ = robot_failed_tx.send(crate::events::RobotFailedEvent {
            robot_id,
            reason: RobotFailedReason::MissedHeartbeats,
            orphaned_jobs,
            occurred_at: now,
        });
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
