use super::*;
use oj_core::{Capability, Robot, RobotStatus};

fn config() -> AssignmentConfig {
    AssignmentConfig::default()
}

#[test]
fn offline_robot_is_filtered_out() {
    let robot = Robot::builder().status(RobotStatus::Offline).build();
    let request = AssignmentRequest::new("wf-1");
    assert!(!passes_hard_filter(&robot, &request, &config()));
}

#[test]
fn robot_at_capacity_is_filtered_out() {
    let mut robot = Robot::builder().max_concurrent_jobs(1).build();
    robot.assign(oj_core::JobId::new());
    let request = AssignmentRequest::new("wf-1");
    assert!(!passes_hard_filter(&robot, &request, &config()));
}

#[test]
fn mismatched_environment_is_filtered_out() {
    let robot = Robot::builder().environment("eu").build();
    let mut request = AssignmentRequest::new("wf-1");
    request.required_environment = Some("us".to_string());
    assert!(!passes_hard_filter(&robot, &request, &config()));
}

#[test]
fn missing_capability_is_filtered_out() {
    let robot = Robot::builder().capabilities(vec![Capability::new("ocr")]).build();
    let mut request = AssignmentRequest::new("wf-1");
    request.required_capabilities = vec!["pdf".parse().unwrap()];
    assert!(!passes_hard_filter(&robot, &request, &config()));
}

#[test]
fn capability_version_satisfied_passes() {
    let robot = Robot::builder().capabilities(vec!["ocr:2.0".parse().unwrap()]).build();
    let mut request = AssignmentRequest::new("wf-1");
    request.required_capabilities = vec!["ocr:1.5".parse().unwrap()];
    assert!(passes_hard_filter(&robot, &request, &config()));
}

#[test]
fn resource_floor_breach_is_filtered_out() {
    let mut robot = Robot::builder().build();
    robot.metrics.cpu_percent = 95.0;
    let request = AssignmentRequest::new("wf-1");
    assert!(!passes_hard_filter(&robot, &request, &config()));
}
