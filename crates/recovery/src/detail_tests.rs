use super::*;
use oj_core::JobId;
use oj_queue::FailOutcome;

#[test]
fn missed_heartbeats_reason_serializes_without_requested_by() {
    let detail = recovery_detail(&RobotFailedReason::MissedHeartbeats, &[]);
    assert_eq!(detail["reason"]["kind"], "missed_heartbeats");
    assert!(detail["jobs"].as_array().unwrap().is_empty());
}

#[test]
fn manual_recovery_reason_carries_the_requester() {
    let reason = RobotFailedReason::ManualRecovery { requested_by: "ops-alice".to_string() };
    let detail = recovery_detail(&reason, &[]);
    assert_eq!(detail["reason"]["kind"], "manual_recovery");
    assert_eq!(detail["reason"]["requested_by"], "ops-alice");
}

#[test]
fn job_decisions_report_their_outcome() {
    let job_id = JobId::new();
    let decisions = vec![JobRecoveryDecision {
        job_id,
        outcome: FailOutcome { moved_to_dlq: false, will_retry: true, resumed: true },
    }];

    let detail = recovery_detail(&RobotFailedReason::ConnectionClosed, &decisions);
    let jobs = detail["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job_id"], job_id.to_string());
    assert_eq!(jobs[0]["resumed"], true);
    assert_eq!(jobs[0]["moved_to_dlq"], false);
}
