// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Domain model, ID macros, and ambient utilities shared across the
//! orchestrator's crates: job and robot state, schedules, the dead-letter
//! queue, audit events, configuration, clock abstraction, and backoff.

#[macro_use]
pub mod macros;
pub mod id;

pub mod audit;
pub mod backoff;
pub mod capability;
pub mod clock;
pub mod config;
pub mod dlq;
pub mod job;
pub mod robot;
pub mod schedule;

pub use audit::{merkle_root, verify_chain, AuditEntity, AuditEvent, AuditEventId};
pub use backoff::BackoffPolicy;
pub use capability::Capability;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    AssignmentConfig, CatchUpPolicy, CoordinatorConfig, OrchestratorConfig, QueueConfig,
    RecoveryConfig, SchedulerConfig,
};
pub use dlq::{DlqEntry, DlqId, FailureRecord};
pub use job::{Checkpoint, ExecutionMode, Job, JobId, JobStatus, JobSubmission};
pub use robot::{Robot, RobotId, RobotMetrics, RobotStatus};
pub use schedule::{ConcurrencyPolicy, RateLimitConfig, Schedule, ScheduleId, ScheduleStrategy, SlaConfig};
