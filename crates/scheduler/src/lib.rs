// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Advanced scheduler (spec.md §4.5): turns time or event stimuli into
//! enqueued jobs, respecting business calendars, SLAs, dependencies, rate
//! limits, and concurrency policy. `Scheduler` is the composition root; the
//! other modules are its individually-testable pure or near-pure pieces.

mod calendar;
mod catchup;
mod concurrency;
mod dependency;
mod error;
mod event_registry;
mod next_run;
mod rate_limiter;
mod scheduler;
mod sla;

pub use calendar::{BusinessCalendar, CalendarDenyPolicy};
pub use catchup::{plan_catch_up, CatchUpPlan};
pub use concurrency::{decide as decide_concurrency, ConcurrencyDecision};
pub use dependency::DependencyTracker;
pub use error::SchedulerError;
pub use event_registry::EventRegistry;
pub use next_run::{next_run_time, validate as validate_strategy};
pub use rate_limiter::{RateLimitDecision, RateLimiter};
pub use scheduler::Scheduler;
pub use sla::{Execution, SlaAlertReceiver, SlaAlertSender, SlaBreachAlert, SlaMonitor, SlaStats, SlaStatus};
