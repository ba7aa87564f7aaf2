// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by the advanced scheduler (spec.md §4.5).
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression `{expression}`: {source}")]
    InvalidCron { expression: String, #[source] source: cron::error::Error },

    #[error("unknown timezone `{0}`")]
    InvalidTimezone(String),

    #[error("dependency schedule `{0}` references an unknown upstream schedule")]
    UnknownUpstream(oj_core::ScheduleId),

    #[error(transparent)]
    Queue(#[from] oj_queue::QueueError),
}
