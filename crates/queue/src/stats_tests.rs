use super::*;
use crate::test_support::connect_or_skip;
use oj_core::{JobSubmission, RobotId};
use serde_json::json;

#[tokio::test]
async fn stats_reflect_status_counts_and_oldest_pending_age() {
    let Some(queue) = connect_or_skip().await else { return };
    queue.enqueue(JobSubmission::builder("wf-1", json!({})).build()).await.unwrap();
    queue.enqueue(JobSubmission::builder("wf-2", json!({})).build()).await.unwrap();

    let stats = queue.stats().await.unwrap();
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.running, 0);
    assert!(stats.oldest_pending_age_secs.unwrap_or(-1) >= 0);
}

#[tokio::test]
async fn depth_by_priority_buckets_pending_jobs() {
    let Some(queue) = connect_or_skip().await else { return };
    queue.enqueue(JobSubmission::builder("wf-1", json!({})).priority(10).build()).await.unwrap();
    queue.enqueue(JobSubmission::builder("wf-2", json!({})).priority(10).build()).await.unwrap();
    queue.enqueue(JobSubmission::builder("wf-3", json!({})).priority(1).build()).await.unwrap();

    let depth = queue.depth_by_priority().await.unwrap();
    assert_eq!(depth.first(), Some(&(10, 2)));
}

#[tokio::test]
async fn peek_filters_by_status_and_workflow() {
    let Some(queue) = connect_or_skip().await else { return };
    queue.enqueue(JobSubmission::builder("target", json!({})).build()).await.unwrap();
    queue.enqueue(JobSubmission::builder("other", json!({})).build()).await.unwrap();

    let filter = PeekFilter { status: Some(JobStatus::Pending), workflow_id: Some("target".into()), limit: 10 };
    let jobs = queue.peek(&filter).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].workflow_id, "target");
}

#[tokio::test]
async fn running_job_ids_reports_only_jobs_claimed_by_that_robot() {
    let Some(queue) = connect_or_skip().await else { return };
    let robot_a = RobotId::new("robot-a");
    let robot_b = RobotId::new("robot-b");
    let job_id = queue.enqueue(JobSubmission::builder("wf-1", json!({})).build()).await.unwrap();
    queue.enqueue(JobSubmission::builder("wf-2", json!({})).build()).await.unwrap();
    queue.claim(&robot_a, 1).await.unwrap();

    let owned = queue.running_job_ids(&robot_a).await.unwrap();
    assert_eq!(owned, vec![job_id]);
    assert!(queue.running_job_ids(&robot_b).await.unwrap().is_empty());
}

#[tokio::test]
async fn get_job_returns_none_for_an_unknown_id() {
    let Some(queue) = connect_or_skip().await else { return };
    assert!(queue.get_job(JobId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn get_job_returns_the_current_row_for_a_known_id() {
    let Some(queue) = connect_or_skip().await else { return };
    let job_id = queue.enqueue(JobSubmission::builder("wf-1", json!({})).build()).await.unwrap();
    let job = queue.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.id, job_id);
    assert_eq!(job.status, JobStatus::Pending);
}

#[tokio::test]
async fn completions_last_minute_counts_only_recently_completed_jobs() {
    let Some(queue) = connect_or_skip().await else { return };
    let robot = RobotId::new("robot-a");
    let job_id = queue.enqueue(JobSubmission::builder("wf-1", json!({})).build()).await.unwrap();
    queue.enqueue(JobSubmission::builder("wf-2", json!({})).build()).await.unwrap();
    queue.claim(&robot, 1).await.unwrap();
    queue.complete(job_id, &robot, json!({})).await.unwrap();

    assert_eq!(queue.completions_last_minute().await.unwrap(), 1);
}
