// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orchestratord`: the orchestrator daemon binary. Loads
//! [`oj_core::OrchestratorConfig`], then wires the durable queue, fleet
//! coordinator, recovery manager, and advanced scheduler together as four
//! independently-cancellable `tokio` tasks (spec.md §4), matching the
//! pack's `anyhow`-at-the-edge / `thiserror`-at-the-boundary error split.

use oj_core::OrchestratorConfig;
use oj_coordinator::Coordinator;
use oj_daemon::env;
use oj_queue::Queue;
use oj_recovery::RecoveryManager;
use oj_scheduler::Scheduler;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<OrchestratorConfig> {
    let path = env::config_path();
    let mut config = match std::fs::read_to_string(&path) {
        Ok(raw) => OrchestratorConfig::from_toml_str(&raw)?,
        Err(_) => {
            tracing::warn!(path = %path.display(), "config file not found, starting from defaults");
            OrchestratorConfig::default()
        }
    };
    env::apply_overrides(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(env::log_filter())).json().init();

    let config = load_config()?;
    tracing::info!(host = %config.coordinator.host, port = config.coordinator.port, "starting orchestrator daemon");

    let queue = Queue::connect(&config.database_url, config.queue.clone()).await?;

    let coordinator = Coordinator::new(queue.clone(), config.coordinator.clone(), config.assignment);
    let recovery = Arc::new(RecoveryManager::new(queue.clone()));
    let scheduler = Arc::new(Scheduler::new(queue.clone(), config.scheduler.clone()));

    let robot_failed_rx = coordinator.subscribe_robot_failed();

    let coordinator_task = tokio::spawn({
        let coordinator = coordinator.clone();
        async move {
            if let Err(error) = coordinator.serve().await {
                tracing::error!(%error, "coordinator exited with error");
            }
        }
    });

    let recovery_task = tokio::spawn({
        let recovery = recovery.clone();
        async move { recovery.run(robot_failed_rx).await }
    });

    let scheduler_task = tokio::spawn({
        let scheduler = scheduler.clone();
        async move {
            if let Err(error) = scheduler.run().await {
                tracing::error!(%error, "scheduler exited with error");
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, draining in-flight work");

    coordinator.cancellation_token().cancel();
    recovery.cancellation_token().cancel();
    scheduler.cancellation_token().cancel();

    let _ = tokio::join!(coordinator_task, recovery_task, scheduler_task);
    tracing::info!("orchestrator daemon stopped");
    Ok(())
}
