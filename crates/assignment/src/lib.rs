// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Job assignment engine (spec.md §4.2).
//!
//! Pure and synchronous: given a job's requirements and a set of connected
//! robots, [`assign`] returns the best match or a [`AssignmentError`]. No I/O,
//! no clock reads beyond what the caller passes in — this is what makes
//! Testable Property 6 (assignment determinism) checkable with a plain unit
//! test.

mod affinity;
mod error;
mod filter;
mod request;
mod score;

pub use affinity::StateAffinityTracker;
pub use error::AssignmentError;
pub use request::AssignmentRequest;
pub use score::ScoreBreakdown;

use oj_core::{AssignmentConfig, Robot, RobotId};

/// The outcome of a successful assignment: the chosen robot plus the full
/// score breakdown of every surviving candidate, for observability.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub robot_id: RobotId,
    pub chosen: ScoreBreakdown,
    pub candidates: Vec<ScoreBreakdown>,
}

/// Run the full filter → score → tie-break pipeline (spec.md §4.2 algorithm).
///
/// `robots` need not be pre-filtered; hard constraints are applied here.
/// `affinity` is consulted read-only — recording a new affinity entry after a
/// successful dispatch is the caller's responsibility.
pub fn assign(
    request: &AssignmentRequest,
    robots: &[Robot],
    config: &AssignmentConfig,
    affinity: &StateAffinityTracker,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<Assignment, AssignmentError> {
    let survivors: Vec<&Robot> = robots.iter().filter(|r| filter::passes_hard_filter(r, request, config)).collect();

    if survivors.is_empty() {
        return Err(AssignmentError::NoCapableRobot);
    }

    let mut candidates: Vec<ScoreBreakdown> =
        survivors.iter().map(|robot| score::score_robot(robot, request, config, affinity, now)).collect();

    // Deterministic ordering: score descending, then least-recently-used
    // (oldest `last_heartbeat_at`) wins an exact tie (spec.md §4.2.3).
    candidates.sort_by(|a, b| {
        b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.last_heartbeat_at.cmp(&b.last_heartbeat_at))
    });

    let chosen = candidates[0].clone();
    let robot_id = chosen.robot_id.clone();
    Ok(Assignment { robot_id, chosen, candidates })
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
