// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the fleet coordinator (spec.md §4.3, §7).
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("robot {0} is not connected")]
    NotConnected(String),

    #[error("robot {0} rejected the assignment: {1}")]
    Rejected(String, String),

    #[error("no connected robot accepted the assignment before timing out")]
    AssignmentTimedOut,

    #[error(transparent)]
    Assignment(#[from] oj_assignment::AssignmentError),

    #[error(transparent)]
    Protocol(#[from] oj_protocol::ProtocolError),

    #[error(transparent)]
    Queue(#[from] oj_queue::QueueError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
