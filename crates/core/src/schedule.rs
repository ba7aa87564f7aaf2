// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule identifier and data model (spec.md §3.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

crate::define_uuid_id! {
    /// Unique identifier for a schedule rule.
    pub struct ScheduleId;
}

/// The strategy governing when a schedule fires. Mirrors the polymorphic
/// `next_run_time(now, last_run) -> Option<time>` capability set of spec.md §4.5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleStrategy {
    Cron { expression: String, timezone: String },
    Interval { seconds: i64 },
    OneTime { at: DateTime<Utc> },
    Event { event_type: String, event_source: String, filter: Option<Json> },
    Dependency { upstream: Vec<ScheduleId>, wait_for_all: bool, trigger_on_success_only: bool },
}

impl ScheduleStrategy {
    /// Strategies that the tick loop polls directly (as opposed to being
    /// triggered via `trigger_event`/`notify_completion`).
    pub fn is_time_driven(&self) -> bool {
        matches!(self, ScheduleStrategy::Cron { .. } | ScheduleStrategy::Interval { .. } | ScheduleStrategy::OneTime { .. })
    }

    pub fn human_description(&self) -> String {
        match self {
            ScheduleStrategy::Cron { expression, timezone } => {
                format!("cron `{expression}` ({timezone})")
            }
            ScheduleStrategy::Interval { seconds } => format!("every {seconds}s"),
            ScheduleStrategy::OneTime { at } => format!("once at {at}"),
            ScheduleStrategy::Event { event_type, event_source, .. } => {
                format!("on event {event_type}@{event_source}")
            }
            ScheduleStrategy::Dependency { upstream, wait_for_all, .. } => {
                let mode = if *wait_for_all { "all" } else { "any" };
                format!("after {mode} of {} upstream schedules", upstream.len())
            }
        }
    }
}

/// Per-schedule SLA targets (spec.md §3.3, §4.5 SLA monitor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaConfig {
    pub target_success_rate: f64,
    pub target_p95_ms: i64,
    pub max_duration_ms: i64,
}

/// Sliding-window rate limit (spec.md §4.5 rate limiter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_executions: u32,
    pub window_seconds: i64,
}

/// What happens when a fire occurs while a prior run of the same schedule
/// is already in flight (spec.md §4.5, open question (a) resolved in DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyPolicy {
    Allow,
    Forbid,
    Replace,
    Coalesce { window_seconds: i64 },
}

crate::simple_display! {
    ConcurrencyPolicy {
        Allow => "allow",
        Forbid => "forbid",
        Replace => "replace",
        Coalesce(..) => "coalesce",
    }
}

/// A schedule rule that materializes jobs into the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub workflow_id: String,
    pub strategy: ScheduleStrategy,
    pub enabled: bool,
    pub calendar_id: Option<String>,
    pub sla_config: Option<SlaConfig>,
    pub rate_limit: Option<RateLimitConfig>,
    pub priority: i32,
    pub last_run_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub concurrency_policy: ConcurrencyPolicy,
}

crate::builder! {
    pub struct ScheduleBuilder => Schedule {
        into {
            workflow_id: String = "wf-1",
        }
        set {
            strategy: ScheduleStrategy = ScheduleStrategy::Interval { seconds: 60 },
            enabled: bool = true,
            sla_config: Option<SlaConfig> = None,
            rate_limit: Option<RateLimitConfig> = None,
            priority: i32 = 0,
            concurrency_policy: ConcurrencyPolicy = ConcurrencyPolicy::Allow,
        }
        option {
            calendar_id: String = None,
            last_run_at: DateTime<Utc> = None,
            next_run_at: DateTime<Utc> = None,
        }
        computed {
            id: ScheduleId = ScheduleId::new(),
        }
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
