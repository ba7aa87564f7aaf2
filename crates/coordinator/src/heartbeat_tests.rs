use super::*;
use crate::events::RobotFailedReason;
use oj_core::{Capability, RobotMetrics, RobotStatus};
use std::collections::HashSet;

fn test_robot(id: &str, last_heartbeat_at: chrono::DateTime<chrono::Utc>) -> oj_core::Robot {
    oj_core::Robot {
        id: oj_core::RobotId::new(id),
        name: id.to_string(),
        environment: "default".to_string(),
        capabilities: vec![Capability::new("ocr")],
        max_concurrent_jobs: 2,
        current_jobs: HashSet::new(),
        status: RobotStatus::Idle,
        tags: HashSet::new(),
        last_heartbeat_at,
        connected_at: last_heartbeat_at,
        metrics: RobotMetrics::default(),
    }
}

#[test]
fn sweep_removes_stale_robot_and_publishes_event() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let now = chrono::Utc::now();
    registry.register(test_robot("robot-a", now - chrono::Duration::seconds(120)), tx);

    let (failed_tx, mut failed_rx) = tokio::sync::broadcast::channel(8);
    sweep_once(&registry, &failed_tx, 60, now);

    assert_eq!(registry.len(), 0);
    let event = failed_rx.try_recv().unwrap();
    assert_eq!(event.reason, RobotFailedReason::MissedHeartbeats);
}

#[test]
fn sweep_leaves_fresh_robots_connected() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let now = chrono::Utc::now();
    registry.register(test_robot("robot-a", now), tx);

    let (failed_tx, mut failed_rx) = tokio::sync::broadcast::channel(8);
    sweep_once(&registry, &failed_tx, 60, now);

    assert_eq!(registry.len(), 1);
    assert!(failed_rx.try_recv().is_err());
}
