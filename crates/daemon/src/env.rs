// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon binary (spec.md
//! §6.4: config loaded from TOML, overridable by `ORCH_*` environment
//! variables at process startup).

use oj_core::OrchestratorConfig;
use std::path::PathBuf;

/// Path to the TOML config file: `ORCH_CONFIG_PATH`, defaulting to
/// `orchestrator.toml` in the current directory.
pub fn config_path() -> PathBuf {
    std::env::var("ORCH_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("orchestrator.toml"))
}

/// Apply every recognized `ORCH_*` override on top of a parsed config. Unset
/// variables leave the corresponding field untouched.
pub fn apply_overrides(config: &mut OrchestratorConfig) {
    if let Ok(url) = std::env::var("ORCH_DATABASE_URL") {
        config.database_url = url;
    }
    if let Ok(host) = std::env::var("ORCH_COORDINATOR_HOST") {
        config.coordinator.host = host;
    }
    if let Some(port) = parse_env("ORCH_COORDINATOR_PORT") {
        config.coordinator.port = port;
    }
    if let Some(secs) = parse_env("ORCH_HEARTBEAT_INTERVAL_SECS") {
        config.coordinator.heartbeat_interval_secs = secs;
    }
    if let Some(secs) = parse_env("ORCH_HEARTBEAT_TIMEOUT_SECS") {
        config.coordinator.heartbeat_timeout_secs = secs;
    }
    if let Some(secs) = parse_env("ORCH_SCHEDULER_TICK_INTERVAL_SECS") {
        config.scheduler.tick_interval_secs = secs;
    }
    if let Some(secs) = parse_env("ORCH_RECOVERY_HEALTH_CHECK_INTERVAL_SECS") {
        config.recovery.health_check_interval_secs = secs;
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok())
}

/// `RUST_LOG`-style filter directive for `tracing-subscriber`'s `EnvFilter`,
/// defaulting to `info` when `ORCH_LOG` is unset.
pub fn log_filter() -> String {
    std::env::var("ORCH_LOG").unwrap_or_else(|_| "info".to_string())
}
