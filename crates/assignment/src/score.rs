// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Soft scoring: weighted sum of CPU/memory headroom, load, tag overlap,
//! zone proximity, and state affinity (spec.md §4.2 step 2).

use crate::affinity::StateAffinityTracker;
use crate::request::AssignmentRequest;
use chrono::{DateTime, Utc};
use oj_core::{AssignmentConfig, Robot, RobotId};
use serde::Serialize;

/// Per-candidate score, broken down by weighted component, returned for
/// observability alongside the winning robot (spec.md §4.2 step 4).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub robot_id: RobotId,
    pub cpu_component: f64,
    pub mem_component: f64,
    pub load_component: f64,
    pub tag_component: f64,
    pub zone_component: f64,
    pub affinity_component: f64,
    pub total: f64,
    #[serde(skip)]
    pub(crate) last_heartbeat_at: DateTime<Utc>,
}

pub(crate) fn score_robot(
    robot: &Robot,
    request: &AssignmentRequest,
    config: &AssignmentConfig,
    affinity: &StateAffinityTracker,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let cpu_component = config.cpu_w * headroom_score(robot.metrics.cpu_percent, config.cpu_soft, config.cpu_hard);
    let mem_component = config.mem_w * headroom_score(robot.metrics.memory_percent, config.mem_soft, config.mem_hard);
    let load_component = config.load_w * (1.0 - robot.load_fraction());
    let tag_component = config.tag_w * jaccard(&robot.tags, &request.tag_preferences);
    let zone_component = config.zone_w
        * match &request.preferred_zone {
            Some(zone) if &robot.environment == zone => 1.0,
            _ => 0.0,
        };
    let affinity_component = config.affinity_w
        * if affinity.is_fresh(&request.workflow_id, &robot.id, now, config.state_ttl_secs) { 1.0 } else { 0.0 };

    let total = cpu_component + mem_component + load_component + tag_component + zone_component + affinity_component;

    ScoreBreakdown {
        robot_id: robot.id.clone(),
        cpu_component,
        mem_component,
        load_component,
        tag_component,
        zone_component,
        affinity_component,
        total,
        last_heartbeat_at: robot.last_heartbeat_at,
    }
}

/// 1.0 at zero usage, linear decay above `soft`, down to 0.0 at `hard`.
fn headroom_score(percent: f64, soft: f64, hard: f64) -> f64 {
    if percent <= soft {
        1.0
    } else if percent >= hard {
        0.0
    } else {
        1.0 - (percent - soft) / (hard - soft)
    }
}

fn jaccard(a: &std::collections::HashSet<String>, b: &std::collections::HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
