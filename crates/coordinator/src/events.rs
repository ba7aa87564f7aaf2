// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinator's `robot_failed` event feed. The Recovery Manager is the
//! sole subscriber; this is a one-way dependency (spec.md §4.4) so the
//! coordinator never has to know recovery exists.

use chrono::{DateTime, Utc};
use oj_core::{JobId, RobotId};
use tokio::sync::broadcast;

/// Why a robot was removed from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RobotFailedReason {
    MissedHeartbeats,
    ConnectionClosed,
    ManualRecovery { requested_by: String },
}

/// Published once per robot removal, carrying every job it still owned so
/// Recovery can act without re-querying the registry under a race.
#[derive(Debug, Clone)]
pub struct RobotFailedEvent {
    pub robot_id: RobotId,
    pub reason: RobotFailedReason,
    pub orphaned_jobs: Vec<JobId>,
    pub occurred_at: DateTime<Utc>,
}

pub type RobotFailedSender = broadcast::Sender<RobotFailedEvent>;
pub type RobotFailedReceiver = broadcast::Receiver<RobotFailedEvent>;

/// Capacity chosen so a burst of simultaneous disconnects (e.g. a network
/// partition taking out a whole zone) doesn't lag the slowest subscriber.
pub const ROBOT_FAILED_CHANNEL_CAPACITY: usize = 256;
