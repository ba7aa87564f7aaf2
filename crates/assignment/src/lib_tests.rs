use super::*;
use oj_core::{Capability, Robot};

/// Testable Property 6: given identical robots and job, the engine returns
/// the same choice and an identical score breakdown across repeated calls.
#[test]
fn assignment_is_deterministic_across_repeated_calls() {
    let robots = vec![
        Robot::builder().id("robot-a").build(),
        Robot::builder().id("robot-b").build(),
    ];
    let request = AssignmentRequest::new("wf-1");
    let config = AssignmentConfig::default();
    let affinity = StateAffinityTracker::new();
    let now = chrono::Utc::now();

    let first = assign(&request, &robots, &config, &affinity, now).unwrap();
    let second = assign(&request, &robots, &config, &affinity, now).unwrap();

    assert_eq!(first.robot_id, second.robot_id);
    assert_eq!(first.chosen.total, second.chosen.total);
}

/// S4 scenario: a job requiring a capability no connected robot has yields
/// `no-capable-robot` rather than an arbitrary or panicking fallback.
#[test]
fn missing_capability_across_fleet_yields_no_capable_robot() {
    let robots = vec![Robot::builder().capabilities(vec![Capability::new("ocr")]).build()];
    let mut request = AssignmentRequest::new("wf-1");
    request.required_capabilities = vec!["pdf".parse().unwrap()];
    let config = AssignmentConfig::default();
    let affinity = StateAffinityTracker::new();

    let result = assign(&request, &robots, &config, &affinity, chrono::Utc::now());
    assert_eq!(result.unwrap_err(), AssignmentError::NoCapableRobot);
}

/// Exact score ties break by least-recently-used robot (oldest heartbeat).
#[test]
fn exact_tie_breaks_by_least_recently_used() {
    let older = Robot::builder().id("robot-old").build();
    let newer = Robot::builder().id("robot-new").build();
    // Builder stamps `last_heartbeat_at` at construction time; force an
    // unambiguous ordering rather than relying on call-to-call clock drift.
    let mut older = older;
    let mut newer = newer;
    older.last_heartbeat_at = chrono::Utc::now() - chrono::Duration::seconds(60);
    newer.last_heartbeat_at = chrono::Utc::now();

    let robots = vec![newer.clone(), older.clone()];
    let request = AssignmentRequest::new("wf-1");
    let config = AssignmentConfig::default();
    let affinity = StateAffinityTracker::new();

    let result = assign(&request, &robots, &config, &affinity, chrono::Utc::now()).unwrap();
    assert_eq!(result.robot_id, older.id);
}

#[test]
fn empty_fleet_yields_no_capable_robot() {
    let request = AssignmentRequest::new("wf-1");
    let config = AssignmentConfig::default();
    let affinity = StateAffinityTracker::new();

    let result = assign(&request, &[], &config, &affinity, chrono::Utc::now());
    assert_eq!(result.unwrap_err(), AssignmentError::NoCapableRobot);
}
