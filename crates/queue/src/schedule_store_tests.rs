use super::*;
use crate::test_support::connect_or_skip;
use oj_core::ScheduleStrategy;

#[tokio::test]
async fn create_schedule_round_trips_through_get_schedule() {
    let Some(queue) = connect_or_skip().await else { return };
    let schedule = Schedule::builder().workflow_id("wf-1").strategy(ScheduleStrategy::Interval { seconds: 30 }).build();

    queue.create_schedule(&schedule).await.unwrap();
    let fetched = queue.get_schedule(schedule.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, schedule.id);
    assert_eq!(fetched.workflow_id, "wf-1");
    assert_eq!(fetched.strategy, ScheduleStrategy::Interval { seconds: 30 });
    assert!(fetched.enabled);
}

#[tokio::test]
async fn list_enabled_schedules_excludes_disabled_ones() {
    let Some(queue) = connect_or_skip().await else { return };
    let enabled = Schedule::builder().workflow_id("wf-enabled").build();
    let disabled = Schedule::builder().workflow_id("wf-disabled").enabled(false).build();
    queue.create_schedule(&enabled).await.unwrap();
    queue.create_schedule(&disabled).await.unwrap();

    let listed = queue.list_enabled_schedules().await.unwrap();
    assert!(listed.iter().any(|s| s.id == enabled.id));
    assert!(!listed.iter().any(|s| s.id == disabled.id));
}

#[tokio::test]
async fn record_schedule_run_updates_last_and_next_run_at() {
    let Some(queue) = connect_or_skip().await else { return };
    let schedule = Schedule::builder().workflow_id("wf-1").build();
    queue.create_schedule(&schedule).await.unwrap();

    let now = Utc::now();
    let next = now + chrono::Duration::seconds(60);
    queue.record_schedule_run(schedule.id, now, Some(next)).await.unwrap();

    let fetched = queue.get_schedule(schedule.id).await.unwrap().unwrap();
    assert_eq!(fetched.last_run_at.unwrap().timestamp(), now.timestamp());
    assert_eq!(fetched.next_run_at.unwrap().timestamp(), next.timestamp());
}

#[tokio::test]
async fn list_schedules_includes_disabled_ones() {
    let Some(queue) = connect_or_skip().await else { return };
    let disabled = Schedule::builder().workflow_id("wf-disabled").enabled(false).build();
    queue.create_schedule(&disabled).await.unwrap();

    let listed = queue.list_schedules().await.unwrap();
    assert!(listed.iter().any(|s| s.id == disabled.id));
}

#[tokio::test]
async fn set_schedule_enabled_toggles_visibility_in_list_enabled() {
    let Some(queue) = connect_or_skip().await else { return };
    let schedule = Schedule::builder().workflow_id("wf-1").build();
    queue.create_schedule(&schedule).await.unwrap();

    queue.set_schedule_enabled(schedule.id, false).await.unwrap();
    assert!(!queue.list_enabled_schedules().await.unwrap().iter().any(|s| s.id == schedule.id));

    queue.set_schedule_enabled(schedule.id, true).await.unwrap();
    assert!(queue.list_enabled_schedules().await.unwrap().iter().any(|s| s.id == schedule.id));
}
