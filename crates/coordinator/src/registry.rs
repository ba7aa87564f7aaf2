// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fleet registry. A [`dashmap::DashMap`] keyed by `robot_id`
//! gives per-robot fine-grained locking without a single registry-wide
//! mutex serializing every heartbeat and assignment.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use oj_core::{JobId, Robot, RobotId, RobotStatus};
use oj_protocol::Envelope;
use tokio::sync::mpsc;

/// Phase of a robot's connection lifecycle (spec.md §4.3 state diagram),
/// distinct from [`RobotStatus`] which tracks job-assignment readiness once
/// a robot is `Registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Registered,
    Unhealthy,
}

oj_core::simple_display! {
    ConnectionPhase {
        Connecting => "connecting",
        Registered => "registered",
        Unhealthy => "unhealthy",
    }
}

/// A connected robot plus the means to push it a frame.
pub struct RobotHandle {
    pub robot: Robot,
    pub phase: ConnectionPhase,
    pub outbound: mpsc::UnboundedSender<Envelope>,
}

/// The fleet coordinator's live view of every connected robot.
#[derive(Default)]
pub struct FleetRegistry {
    robots: DashMap<RobotId, RobotHandle>,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, robot: Robot, outbound: mpsc::UnboundedSender<Envelope>) {
        self.robots.insert(robot.id.clone(), RobotHandle { robot, phase: ConnectionPhase::Registered, outbound });
    }

    pub fn remove(&self, robot_id: &RobotId) -> Option<RobotHandle> {
        self.robots.remove(robot_id).map(|(_, handle)| handle)
    }

    pub fn contains(&self, robot_id: &RobotId) -> bool {
        self.robots.contains_key(robot_id)
    }

    /// Snapshot every registered robot, for assignment candidate selection
    /// and admin introspection. Cloned out from under the per-entry lock so
    /// callers never hold a `DashMap` guard across an `.await`.
    pub fn snapshot(&self) -> Vec<Robot> {
        self.robots.iter().map(|entry| entry.robot.clone()).collect()
    }

    pub fn get_robot(&self, robot_id: &RobotId) -> Option<Robot> {
        self.robots.get(robot_id).map(|entry| entry.robot.clone())
    }

    pub fn send(&self, robot_id: &RobotId, envelope: Envelope) -> bool {
        match self.robots.get(robot_id) {
            Some(entry) => entry.outbound.send(envelope).is_ok(),
            None => false,
        }
    }

    pub fn update_heartbeat(&self, robot_id: &RobotId, metrics: oj_core::RobotMetrics, at: DateTime<Utc>) {
        if let Some(mut entry) = self.robots.get_mut(robot_id) {
            entry.robot.metrics = metrics;
            entry.robot.last_heartbeat_at = at;
            if entry.phase == ConnectionPhase::Unhealthy {
                entry.phase = ConnectionPhase::Registered;
            }
        }
    }

    pub fn assign_job(&self, robot_id: &RobotId, job_id: JobId) -> bool {
        match self.robots.get_mut(robot_id) {
            Some(mut entry) => entry.robot.assign(job_id),
            None => false,
        }
    }

    pub fn release_job(&self, robot_id: &RobotId, job_id: &JobId) {
        if let Some(mut entry) = self.robots.get_mut(robot_id) {
            entry.robot.release(job_id);
        }
    }

    pub fn mark_status(&self, robot_id: &RobotId, status: RobotStatus) {
        if let Some(mut entry) = self.robots.get_mut(robot_id) {
            entry.robot.status = status;
        }
    }

    /// Robots whose last heartbeat is older than `timeout_secs` as of `now`.
    pub fn stale_robots(&self, now: DateTime<Utc>, timeout_secs: u64) -> Vec<RobotId> {
        self.robots
            .iter()
            .filter(|entry| (now - entry.robot.last_heartbeat_at).num_seconds() > timeout_secs as i64)
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
