use super::*;
use chrono::Duration;

fn interval_schedule() -> ScheduleStrategy {
    ScheduleStrategy::Interval { seconds: 60 }
}

#[test]
fn skip_drops_missed_fires_and_resumes_from_next_occurrence() {
    let strategy = interval_schedule();
    let missed_at = Utc::now() - Duration::minutes(10);
    let now = Utc::now();

    let plan = plan_catch_up(&strategy, CatchUpPolicy::Skip, missed_at, now).unwrap();
    assert!(plan.fires.is_empty());
    assert!(plan.next_run_at.is_some());
}

#[test]
fn one_replays_exactly_the_missed_slot() {
    let strategy = interval_schedule();
    let missed_at = Utc::now() - Duration::minutes(10);
    let now = Utc::now();

    let plan = plan_catch_up(&strategy, CatchUpPolicy::One, missed_at, now).unwrap();
    assert_eq!(plan.fires, vec![missed_at]);
}

#[test]
fn all_replays_every_missed_slot_up_to_now() {
    let strategy = interval_schedule();
    let now = Utc::now();
    let missed_at = now - Duration::minutes(5);

    let plan = plan_catch_up(&strategy, CatchUpPolicy::All, missed_at, now).unwrap();
    // Five minutes missed at a 60s interval: the original slot plus five
    // more land at or before `now`.
    assert_eq!(plan.fires.len(), 6);
}

#[test]
fn all_is_capped_so_a_stale_fast_interval_does_not_flood_the_queue() {
    let strategy = ScheduleStrategy::Interval { seconds: 1 };
    let now = Utc::now();
    let missed_at = now - Duration::hours(1);

    let plan = plan_catch_up(&strategy, CatchUpPolicy::All, missed_at, now).unwrap();
    assert_eq!(plan.fires.len(), MAX_CATCH_UP_FIRES);
}
