// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator-wide configuration bundle (spec.md §6.4).
//!
//! Loaded from TOML with `serde(default)` per-field defaults and overridable
//! by `ORCH_*` environment variables at the daemon's composition boundary.

use serde::{Deserialize, Serialize};

/// Durable job queue tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub visibility_timeout_secs: u64,
    pub max_retries: i32,
    pub base_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub jitter: f64,
    pub poll_interval_ms: u64,
    pub notify_channel_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            visibility_timeout_secs: 300,
            max_retries: 3,
            base_delay_ms: 1_000,
            multiplier: 2.0,
            max_delay_ms: 300_000,
            jitter: 0.2,
            poll_interval_ms: 500,
            notify_channel_name: "oj_job_queue".to_string(),
        }
    }
}

/// Fleet coordinator (WebSocket server) tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub host: String,
    pub port: u16,
    pub heartbeat_interval_secs: u64,
    pub heartbeat_timeout_secs: u64,
    pub connection_timeout_secs: u64,
    pub max_message_bytes: usize,
    pub api_key_required: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7781,
            heartbeat_interval_secs: 15,
            heartbeat_timeout_secs: 45,
            connection_timeout_secs: 10,
            max_message_bytes: 1 << 20,
            api_key_required: true,
        }
    }
}

/// Weighted scoring coefficients for the assignment engine (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    pub cpu_w: f64,
    pub mem_w: f64,
    pub load_w: f64,
    pub tag_w: f64,
    pub zone_w: f64,
    pub affinity_w: f64,
    pub cpu_soft: f64,
    pub cpu_hard: f64,
    pub mem_soft: f64,
    pub mem_hard: f64,
    /// Seconds a robot's prior-affinity entry stays eligible to influence scoring.
    pub state_ttl_secs: u64,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            cpu_w: 0.25,
            mem_w: 0.2,
            load_w: 0.3,
            tag_w: 0.1,
            zone_w: 0.1,
            affinity_w: 0.05,
            cpu_soft: 70.0,
            cpu_hard: 90.0,
            mem_soft: 75.0,
            mem_hard: 92.0,
            state_ttl_secs: 600,
        }
    }
}

/// What the scheduler does with fires that occurred while it was not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatchUpPolicy {
    /// Enqueue a single catch-up run regardless of how many fires were missed.
    One,
    /// Enqueue one run per missed fire.
    All,
    /// Drop missed fires; resume from the next scheduled occurrence.
    Skip,
}

crate::simple_display! {
    CatchUpPolicy {
        One => "one",
        All => "all",
        Skip => "skip",
    }
}

/// Advanced scheduler tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_interval_secs: u64,
    pub catch_up_policy: CatchUpPolicy,
    pub default_timezone: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { tick_interval_secs: 1, catch_up_policy: CatchUpPolicy::Skip, default_timezone: "UTC".to_string() }
    }
}

impl Default for CatchUpPolicy {
    fn default() -> Self {
        CatchUpPolicy::Skip
    }
}

/// Robot recovery manager tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub health_check_interval_secs: u64,
    pub max_concurrent_recoveries: usize,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self { health_check_interval_secs: 5, max_concurrent_recoveries: 16 }
    }
}

/// The orchestrator daemon's complete configuration, as loaded from TOML and
/// overridden by `ORCH_*` environment variables at process startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub database_url: String,
    pub queue: QueueConfig,
    pub coordinator: CoordinatorConfig,
    pub assignment: AssignmentConfig,
    pub scheduler: SchedulerConfig,
    pub recovery: RecoveryConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/orchestrator".to_string(),
            queue: QueueConfig::default(),
            coordinator: CoordinatorConfig::default(),
            assignment: AssignmentConfig::default(),
            scheduler: SchedulerConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Parse a TOML document, falling back to per-field defaults for
    /// anything the document omits (mirrors the teacher's layered config
    /// loading: file first, then environment overrides applied by the
    /// daemon's composition root).
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
