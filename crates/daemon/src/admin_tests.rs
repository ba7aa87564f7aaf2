use super::*;
use oj_core::robot::RobotBuilder;
use oj_core::{CoordinatorConfig, JobSubmission, SchedulerConfig};
use serde_json::json;

async fn test_context() -> Option<AdminContext> {
    let queue = oj_queue::test_support::connect_or_skip().await?;
    let coordinator = Coordinator::new(queue.clone(), CoordinatorConfig::default(), oj_core::AssignmentConfig::default());
    let scheduler = Arc::new(Scheduler::new(queue.clone(), SchedulerConfig::default()));
    Some(AdminContext { queue, coordinator, scheduler })
}

#[tokio::test]
async fn queue_stats_reports_pending_depth() {
    let Some(ctx) = test_context().await else { return };
    ctx.queue.enqueue(JobSubmission::builder("wf-1", json!({})).build()).await.unwrap();

    let response = handle_query(&ctx, Query::QueueStats).await;
    match response {
        Response::QueueStats { stats } => assert!(stats.pending >= 1),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn list_robots_reflects_the_fleet_registry() {
    let Some(ctx) = test_context().await else { return };
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    ctx.coordinator.registry().register(RobotBuilder::default().id("robot-admin").build(), tx);

    let response = handle_query(&ctx, Query::ListRobots).await;
    match response {
        Response::Robots { robots } => assert!(robots.iter().any(|r| r.id.as_str() == "robot-admin")),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn get_robot_returns_none_for_an_unknown_id() {
    let Some(ctx) = test_context().await else { return };
    let response = handle_query(&ctx, Query::GetRobot { robot_id: oj_core::RobotId::new("ghost") }).await;
    assert!(matches!(response, Response::Robot { robot: None }));
}

#[tokio::test]
async fn replay_dlq_entry_resolves_job_id_to_dlq_id_and_enqueues_a_new_job() {
    let Some(ctx) = test_context().await else { return };
    let robot_id = oj_core::RobotId::new("robot-dlq");
    let job_id = ctx.queue.enqueue(JobSubmission::builder("wf-dlq", json!({})).max_retries(0).build()).await.unwrap();
    ctx.queue.claim(&robot_id, 1).await.unwrap();
    ctx.queue.fail(job_id, &robot_id, "unrecoverable", None).await.unwrap();

    let response = handle_query(&ctx, Query::ReplayDlqEntry { job_id }).await;
    match response {
        Response::DlqReplayed { new_job_id, .. } => assert_ne!(new_job_id, job_id),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn replay_dlq_entry_errors_when_no_dlq_entry_exists_for_the_job() {
    let Some(ctx) = test_context().await else { return };
    let response = handle_query(&ctx, Query::ReplayDlqEntry { job_id: oj_core::JobId::new() }).await;
    assert!(matches!(response, Response::Error { .. }));
}

#[tokio::test]
async fn list_schedules_and_get_schedule_round_trip() {
    let Some(ctx) = test_context().await else { return };
    let schedule = oj_core::Schedule::builder().workflow_id("wf-admin").build();
    ctx.queue.create_schedule(&schedule).await.unwrap();

    let listed = handle_query(&ctx, Query::ListSchedules).await;
    match listed {
        Response::Schedules { schedules } => assert!(schedules.iter().any(|s| s.id == schedule.id)),
        other => panic!("unexpected response: {other:?}"),
    }

    let fetched = handle_query(&ctx, Query::GetSchedule { schedule_id: schedule.id }).await;
    assert!(matches!(fetched, Response::Schedule { schedule: Some(_) }));
}

#[tokio::test]
async fn get_sla_status_reports_no_data_before_any_execution() {
    let Some(ctx) = test_context().await else { return };
    let schedule = oj_core::Schedule::builder()
        .workflow_id("wf-sla")
        .sla_config(Some(oj_core::SlaConfig { target_success_rate: 0.9, target_p95_ms: 5_000, max_duration_ms: 10_000 }))
        .build();
    ctx.queue.create_schedule(&schedule).await.unwrap();

    let response = handle_query(&ctx, Query::GetSlaStatus { schedule_id: schedule.id }).await;
    assert!(matches!(response, Response::Error { .. }));
}
