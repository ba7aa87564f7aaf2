// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure JSON shaping for the `recovery_event` audit detail — no I/O, so the
//! shape is unit-testable without a database (mirrors `oj-assignment`'s
//! pure-scoring-function split).

use crate::manager::JobRecoveryDecision;
use oj_coordinator::RobotFailedReason;
use serde_json::{json, Value as Json};

pub(crate) fn recovery_detail(reason: &RobotFailedReason, decisions: &[JobRecoveryDecision]) -> Json {
    json!({
        "reason": reason_label(reason),
        "jobs": decisions.iter().map(job_decision_json).collect::<Vec<_>>(),
    })
}

fn reason_label(reason: &RobotFailedReason) -> Json {
    match reason {
        RobotFailedReason::MissedHeartbeats => json!({"kind": "missed_heartbeats"}),
        RobotFailedReason::ConnectionClosed => json!({"kind": "connection_closed"}),
        RobotFailedReason::ManualRecovery { requested_by } => {
            json!({"kind": "manual_recovery", "requested_by": requested_by})
        }
    }
}

fn job_decision_json(decision: &JobRecoveryDecision) -> Json {
    json!({
        "job_id": decision.job_id.to_string(),
        "moved_to_dlq": decision.outcome.moved_to_dlq,
        "will_retry": decision.outcome.will_retry,
        "resumed": decision.outcome.resumed,
    })
}

#[cfg(test)]
#[path = "detail_tests.rs"]
mod tests;
