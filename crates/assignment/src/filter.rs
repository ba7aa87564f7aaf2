// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hard filter: candidates that fail any of these are never scored
//! (spec.md §4.2 step 1).

use crate::request::AssignmentRequest;
use oj_core::{AssignmentConfig, Robot, RobotStatus};

pub(crate) fn passes_hard_filter(robot: &Robot, request: &AssignmentRequest, config: &AssignmentConfig) -> bool {
    let status_ok = matches!(robot.status, RobotStatus::Idle | RobotStatus::Busy) && robot.has_capacity();
    if !status_ok {
        return false;
    }

    if let Some(env) = &request.required_environment {
        if &robot.environment != env {
            return false;
        }
    }

    if !robot.covers(&request.required_capabilities) {
        return false;
    }

    let cpu_headroom = 100.0 - robot.metrics.cpu_percent;
    let mem_headroom = 100.0 - robot.metrics.memory_percent;
    if cpu_headroom < 100.0 - config.cpu_hard || mem_headroom < 100.0 - config.mem_hard {
        return false;
    }

    true
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
