use super::*;
use oj_core::{ConcurrencyPolicy, RateLimitConfig, SchedulerConfig};
use serde_json::json;

async fn test_queue() -> Option<Queue> {
    oj_queue::test_support::connect_or_skip().await
}

fn interval_schedule(workflow_id: &str) -> Schedule {
    Schedule::builder().workflow_id(workflow_id).strategy(ScheduleStrategy::Interval { seconds: 3600 }).enabled(true).build()
}

#[tokio::test]
async fn tick_fires_a_due_interval_schedule_and_advances_next_run_at() {
    let Some(queue) = test_queue().await else { return };
    let scheduler = Scheduler::new(queue.clone(), SchedulerConfig::default());

    let mut schedule = interval_schedule("wf-tick-1");
    schedule.next_run_at = Some(Utc::now() - chrono::Duration::seconds(1));
    queue.create_schedule(&schedule).await.unwrap();

    scheduler.tick(Utc::now()).await.unwrap();

    let fetched = queue.get_schedule(schedule.id).await.unwrap().unwrap();
    assert!(fetched.last_run_at.is_some());
    assert!(fetched.next_run_at.unwrap() > Utc::now());

    let stats = queue.stats().await.unwrap();
    assert!(stats.pending >= 1);
}

#[tokio::test]
async fn forbid_concurrency_policy_skips_a_second_fire_while_one_is_in_flight() {
    let Some(queue) = test_queue().await else { return };
    let scheduler = Scheduler::new(queue.clone(), SchedulerConfig::default());

    let mut schedule = interval_schedule("wf-forbid");
    schedule.concurrency_policy = ConcurrencyPolicy::Forbid;
    schedule.next_run_at = Some(Utc::now() - chrono::Duration::seconds(1));
    queue.create_schedule(&schedule).await.unwrap();

    let now = Utc::now();
    let first = scheduler.fire(&schedule, now).await.unwrap();
    assert!(first.is_some());

    let fetched = queue.get_schedule(schedule.id).await.unwrap().unwrap();
    let second = scheduler.fire(&fetched, now + chrono::Duration::seconds(1)).await.unwrap();
    assert!(second.is_none());
}

#[tokio::test]
async fn rate_limiter_rejects_a_fire_beyond_the_configured_window() {
    let Some(queue) = test_queue().await else { return };
    let scheduler = Scheduler::new(queue.clone(), SchedulerConfig::default());

    let mut schedule = interval_schedule("wf-rate-limited");
    schedule.rate_limit = Some(RateLimitConfig { max_executions: 1, window_seconds: 3600 });
    schedule.next_run_at = Some(Utc::now());
    queue.create_schedule(&schedule).await.unwrap();

    let now = Utc::now();
    assert!(scheduler.fire(&schedule, now).await.unwrap().is_some());
    let fetched = queue.get_schedule(schedule.id).await.unwrap().unwrap();
    assert!(scheduler.fire(&fetched, now + chrono::Duration::seconds(1)).await.unwrap().is_none());
}

#[tokio::test]
async fn trigger_event_fires_every_matching_subscription() {
    let Some(queue) = test_queue().await else { return };
    let scheduler = Scheduler::new(queue.clone(), SchedulerConfig::default());

    let schedule = Schedule::builder()
        .workflow_id("wf-event")
        .strategy(ScheduleStrategy::Event { event_type: "upload.complete".to_string(), event_source: "ingest".to_string(), filter: None })
        .build();
    queue.create_schedule(&schedule).await.unwrap();
    scheduler.subscribe_event(schedule.id, "upload.complete", "ingest", None);

    let fired = scheduler.trigger_event("upload.complete", "ingest", json!({"bucket": "raw"})).await.unwrap();
    assert_eq!(fired.len(), 1);
}

#[tokio::test]
async fn notify_completion_fires_a_satisfied_dependency_schedule() {
    let Some(queue) = test_queue().await else { return };
    let scheduler = Scheduler::new(queue.clone(), SchedulerConfig::default());

    let upstream = interval_schedule("wf-upstream");
    queue.create_schedule(&upstream).await.unwrap();
    let downstream = Schedule::builder()
        .workflow_id("wf-downstream")
        .strategy(ScheduleStrategy::Dependency { upstream: vec![upstream.id], wait_for_all: true, trigger_on_success_only: true })
        .build();
    queue.create_schedule(&downstream).await.unwrap();

    let job_id = scheduler.dispatch(&upstream, Utc::now()).await.unwrap();
    let fired = scheduler.notify_completion(job_id, true, Utc::now()).await.unwrap();
    assert_eq!(fired.len(), 1);
}
