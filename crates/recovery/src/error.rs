// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the recovery manager (spec.md §4.4, §7).
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error(transparent)]
    Queue(#[from] oj_queue::QueueError),
}
