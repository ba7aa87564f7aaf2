// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-schedule SLA monitoring (spec.md §4.5 SLA monitor). Execution
//! outcomes are recorded into a bounded sliding window per schedule;
//! derived stats drive an `ok`/`at_risk`/`breached` status that, on
//! breach, publishes an alert on a `tokio::sync::broadcast` channel —
//! the same fan-out shape as the coordinator's `robot_failed` feed.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use oj_core::{ScheduleId, SlaConfig};
use tokio::sync::broadcast;

/// One recorded execution outcome for a schedule.
#[derive(Debug, Clone, Copy)]
pub struct Execution {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub succeeded: bool,
}

impl Execution {
    fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds().max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaStatus {
    Ok,
    AtRisk,
    Breached,
}

oj_core::simple_display! {
    SlaStatus {
        Ok => "ok",
        AtRisk => "at_risk",
        Breached => "breached",
    }
}

/// Derived statistics over a schedule's retained execution window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaStats {
    pub sample_count: usize,
    pub success_rate: f64,
    pub p50_ms: i64,
    pub p95_ms: i64,
    pub average_ms: i64,
    pub status: SlaStatus,
}

/// Published when a schedule's computed status is `Breached`.
#[derive(Debug, Clone)]
pub struct SlaBreachAlert {
    pub schedule_id: ScheduleId,
    pub stats: SlaStats,
    pub occurred_at: DateTime<Utc>,
}

pub type SlaAlertSender = broadcast::Sender<SlaBreachAlert>;
pub type SlaAlertReceiver = broadcast::Receiver<SlaBreachAlert>;

/// Bound on retained executions per schedule; old ones fall off the front.
const WINDOW_CAPACITY: usize = 100;
/// Capacity of the breach-alert broadcast channel.
pub const SLA_ALERT_CHANNEL_CAPACITY: usize = 64;

pub struct SlaMonitor {
    windows: DashMap<ScheduleId, Vec<Execution>>,
    alerts: SlaAlertSender,
}

impl Default for SlaMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SlaMonitor {
    pub fn new() -> Self {
        let (alerts, _) = broadcast::channel(SLA_ALERT_CHANNEL_CAPACITY);
        Self { windows: DashMap::new(), alerts }
    }

    pub fn subscribe(&self) -> SlaAlertReceiver {
        self.alerts.subscribe()
    }

    /// Record a completed execution and, if an `SlaConfig` is supplied and
    /// the resulting status is `Breached`, publish an alert.
    pub fn record(&self, schedule_id: ScheduleId, execution: Execution, config: Option<&SlaConfig>) {
        let mut window = self.windows.entry(schedule_id).or_default();
        window.push(execution);
        if window.len() > WINDOW_CAPACITY {
            let overflow = window.len() - WINDOW_CAPACITY;
            window.drain(0..overflow);
        }

        let Some(config) = config else { return };
        let stats = stats_for(&window, config);
        drop(window);

        if stats.status == SlaStatus::Breached {
            let _ = self.alerts.send(SlaBreachAlert { schedule_id, stats, occurred_at: execution.completed_at });
        }
    }

    pub fn stats(&self, schedule_id: ScheduleId, config: &SlaConfig) -> Option<SlaStats> {
        let window = self.windows.get(&schedule_id)?;
        Some(stats_for(&window, config))
    }
}

fn stats_for(window: &[Execution], config: &SlaConfig) -> SlaStats {
    let sample_count = window.len();
    if sample_count == 0 {
        return SlaStats { sample_count: 0, success_rate: 1.0, p50_ms: 0, p95_ms: 0, average_ms: 0, status: SlaStatus::Ok };
    }

    let successes = window.iter().filter(|e| e.succeeded).count();
    let success_rate = successes as f64 / sample_count as f64;

    let mut durations: Vec<i64> = window.iter().map(Execution::duration_ms).collect();
    durations.sort_unstable();
    let average_ms = durations.iter().sum::<i64>() / sample_count as i64;
    let p50_ms = percentile(&durations, 50.0);
    let p95_ms = percentile(&durations, 95.0);

    let breached = success_rate < config.target_success_rate || p95_ms > config.target_p95_ms || durations.iter().any(|d| *d > config.max_duration_ms);
    let at_risk = !breached && (p95_ms as f64 > config.target_p95_ms as f64 * 0.8 || success_rate < config.target_success_rate + 0.05);

    let status = if breached {
        SlaStatus::Breached
    } else if at_risk {
        SlaStatus::AtRisk
    } else {
        SlaStatus::Ok
    };

    SlaStats { sample_count, success_rate, p50_ms, p95_ms, average_ms, status }
}

/// Nearest-rank percentile over an already-sorted slice.
fn percentile(sorted: &[i64], pct: f64) -> i64 {
    if sorted.is_empty() {
        return 0;
    }
    let rank = ((pct / 100.0) * sorted.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index]
}

#[cfg(test)]
#[path = "sla_tests.rs"]
mod tests;
