use super::*;
use crate::test_support::connect_or_skip;
use oj_core::{JobSubmission, RobotId};
use serde_json::json;

async fn force_to_dlq_with_submission(queue: &Queue, submission: JobSubmission) -> oj_core::JobId {
    let job_id = queue.enqueue(submission).await.unwrap();
    let robot_id = RobotId::new("robot-a");
    queue.claim(&robot_id, 1).await.unwrap();
    let outcome = queue.fail(job_id, &robot_id, "unrecoverable", None).await.unwrap();
    assert!(outcome.moved_to_dlq);
    job_id
}

async fn force_to_dlq(queue: &Queue, workflow_id: &str) -> oj_core::JobId {
    let job_id = queue.enqueue(JobSubmission::builder(workflow_id, json!({})).max_retries(0).build()).await.unwrap();
    let robot_id = RobotId::new("robot-a");
    queue.claim(&robot_id, 1).await.unwrap();
    let outcome = queue.fail(job_id, &robot_id, "unrecoverable", None).await.unwrap();
    assert!(outcome.moved_to_dlq);
    job_id
}

#[tokio::test]
async fn list_dlq_returns_most_recent_first() {
    let Some(queue) = connect_or_skip().await else { return };
    force_to_dlq(&queue, "wf-dlq-1").await;
    force_to_dlq(&queue, "wf-dlq-2").await;

    let entries = queue.list_dlq(10).await.unwrap();
    assert!(entries.len() >= 2);
    assert!(entries[0].moved_to_dlq_at >= entries[1].moved_to_dlq_at);
}

#[tokio::test]
async fn replay_dlq_enqueues_a_new_job_and_marks_the_entry_replayed() {
    let Some(queue) = connect_or_skip().await else { return };
    let job_id = force_to_dlq(&queue, "wf-dlq-replay").await;

    let entries = queue.list_dlq(50).await.unwrap();
    let entry = entries.iter().find(|e| e.job_id == job_id).unwrap();

    let new_job_id = queue.replay_dlq(entry.id).await.unwrap();
    assert_ne!(new_job_id, job_id);

    let err = queue.replay_dlq(entry.id).await.unwrap_err();
    assert!(matches!(err, QueueError::InvalidTransition { .. }));
}

// spec.md §3.4: the DLQ snapshot must carry the original job's fields so
// reprocessing reproduces it faithfully — a replayed job must not lose its
// capability requirements or seeded variables.
#[tokio::test]
async fn replay_dlq_preserves_required_capabilities_and_initial_variables() {
    let Some(queue) = connect_or_skip().await else { return };
    let submission = JobSubmission::builder("wf-dlq-fidelity", json!({"step": 1}))
        .max_retries(0)
        .required_capabilities(vec!["ocr:2.0".parse().unwrap()])
        .initial_variables(json!({"seeded": true}))
        .priority(7)
        .build();
    let job_id = force_to_dlq_with_submission(&queue, submission).await;

    let entry = queue.find_dlq_by_job(job_id).await.unwrap().unwrap();
    assert_eq!(entry.required_capabilities.len(), 1);
    assert_eq!(entry.required_capabilities[0].name, "ocr");
    assert_eq!(entry.initial_variables, json!({"seeded": true}));
    assert_eq!(entry.priority, 7);

    let new_job_id = queue.replay_dlq(entry.id).await.unwrap();
    let replayed = queue.get_job(new_job_id).await.unwrap().unwrap();
    assert_eq!(replayed.required_capabilities.len(), 1);
    assert_eq!(replayed.required_capabilities[0].name, "ocr");
    assert_eq!(replayed.initial_variables, json!({"seeded": true}));
    assert_eq!(replayed.priority, 7);
}

#[tokio::test]
async fn find_dlq_by_job_resolves_the_dlq_id_for_an_original_job() {
    let Some(queue) = connect_or_skip().await else { return };
    let job_id = force_to_dlq(&queue, "wf-dlq-lookup").await;

    let found = queue.find_dlq_by_job(job_id).await.unwrap().unwrap();
    assert_eq!(found.job_id, job_id);
    assert!(queue.find_dlq_by_job(JobId::new()).await.unwrap().is_none());
}
