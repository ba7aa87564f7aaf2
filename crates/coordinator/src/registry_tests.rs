use super::*;
use oj_core::{Capability, JobId, RobotMetrics};
use std::collections::HashSet;

fn test_robot(id: &str) -> Robot {
    let now = Utc::now();
    Robot {
        id: RobotId::new(id),
        name: id.to_string(),
        environment: "default".to_string(),
        capabilities: vec![Capability::new("ocr")],
        max_concurrent_jobs: 2,
        current_jobs: HashSet::new(),
        status: RobotStatus::Idle,
        tags: HashSet::new(),
        last_heartbeat_at: now,
        connected_at: now,
        metrics: RobotMetrics::default(),
    }
}

#[test]
fn register_and_get_round_trips() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    registry.register(test_robot("robot-a"), tx);

    let fetched = registry.get_robot(&RobotId::new("robot-a")).unwrap();
    assert_eq!(fetched.name, "robot-a");
    assert_eq!(registry.len(), 1);
}

#[test]
fn assign_and_release_job_updates_current_jobs() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let id = RobotId::new("robot-a");
    registry.register(test_robot("robot-a"), tx);

    let job_id = JobId::new();
    assert!(registry.assign_job(&id, job_id));
    assert_eq!(registry.get_robot(&id).unwrap().current_jobs.len(), 1);

    registry.release_job(&id, &job_id);
    assert_eq!(registry.get_robot(&id).unwrap().current_jobs.len(), 0);
}

#[test]
fn assign_job_fails_once_robot_is_at_capacity() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut robot = test_robot("robot-a");
    robot.max_concurrent_jobs = 1;
    let id = robot.id.clone();
    registry.register(robot, tx);

    assert!(registry.assign_job(&id, JobId::new()));
    assert!(!registry.assign_job(&id, JobId::new()));
}

#[test]
fn stale_robots_reports_ids_past_heartbeat_timeout() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut robot = test_robot("robot-a");
    robot.last_heartbeat_at = Utc::now() - chrono::Duration::seconds(120);
    registry.register(robot, tx);

    let now = Utc::now();
    assert_eq!(registry.stale_robots(now, 60), vec![RobotId::new("robot-a")]);
    assert!(registry.stale_robots(now, 300).is_empty());
}

#[test]
fn update_heartbeat_clears_unhealthy_phase() {
    let registry = FleetRegistry::new();
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    registry.register(test_robot("robot-a"), tx);
    let id = RobotId::new("robot-a");

    registry.update_heartbeat(&id, RobotMetrics { cpu_percent: 10.0, memory_percent: 20.0 }, Utc::now());
    let robot = registry.get_robot(&id).unwrap();
    assert_eq!(robot.metrics.cpu_percent, 10.0);
}
