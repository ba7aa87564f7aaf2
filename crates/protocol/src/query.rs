// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only admin/query surface (spec.md §4.6 [ADD]).
//!
//! The internal request shape that an out-of-scope HTTP/UI layer would call
//! into; message semantics only, mirroring the teacher's `oj-wire::Query`.

use oj_core::{JobId, RobotId, ScheduleId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// Queue depth, by-status counts, and throughput over a trailing window.
    QueueStats,

    /// List dead-lettered jobs, most recent first.
    ListDlq {
        #[serde(default)]
        limit: usize,
    },

    /// Re-enqueue a dead-lettered job as a fresh job.
    ReplayDlqEntry { job_id: JobId },

    /// The current fleet roster, as tracked by the coordinator's registry.
    ListRobots,

    /// A single robot's detail, if connected.
    GetRobot { robot_id: RobotId },

    /// All configured schedules.
    ListSchedules,

    /// A single schedule's detail and recent run history.
    GetSchedule { schedule_id: ScheduleId },

    /// SLA compliance for a schedule over its configured window.
    GetSlaStatus { schedule_id: ScheduleId },
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
