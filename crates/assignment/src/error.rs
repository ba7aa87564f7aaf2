// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the assignment engine (spec.md §4.2, §8 scenario S4).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignmentError {
    /// No connected robot survived the hard filter. The caller should leave
    /// the job `pending` and retry on the next poll/notify tick.
    #[error("no connected robot satisfies the job's capability, environment, or resource requirements")]
    NoCapableRobot,
}
