use super::*;
use chrono::{Datelike, TimeZone, Timelike, Weekday};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

#[test]
fn cron_fires_at_the_next_matching_instant() {
    let strategy = ScheduleStrategy::Cron { expression: "0 0 * * * *".to_string(), timezone: "UTC".to_string() };
    let now = at(2026, 1, 1, 10, 15, 0);
    let next = next_run_time(&strategy, now, None).unwrap().unwrap();
    assert_eq!(next, at(2026, 1, 1, 11, 0, 0));
}

// spec.md §4.5/§8 S6's literal cron expression is standard 5-field
// (`0 9 * * MON-FRI`), one field short of what the `cron` crate accepts
// on its own — this must still parse and fire correctly Mon-Fri, skipping
// weekends, in the scenario's own `America/Sao_Paulo` timezone.
#[test]
fn cron_accepts_spec_literal_five_field_expression_and_skips_the_weekend() {
    let strategy = ScheduleStrategy::Cron { expression: "0 9 * * MON-FRI".to_string(), timezone: "America/Sao_Paulo".to_string() };
    assert!(validate(&strategy).is_ok());

    let tz: chrono_tz::Tz = "America/Sao_Paulo".parse().unwrap();
    // 2026-01-02 is a Friday.
    let friday_after_fire = tz.with_ymd_and_hms(2026, 1, 2, 9, 0, 1).unwrap().with_timezone(&Utc);
    let next = next_run_time(&strategy, friday_after_fire, None).unwrap().unwrap();
    let next_local = next.with_timezone(&tz);

    assert_eq!(next_local.weekday(), Weekday::Mon, "Saturday/Sunday must be skipped");
    assert_eq!((next_local.day(), next_local.hour(), next_local.minute()), (5, 9, 0));
}

#[test]
fn cron_rejects_an_unknown_timezone() {
    let strategy = ScheduleStrategy::Cron { expression: "0 0 * * * *".to_string(), timezone: "Mars/Olympus".to_string() };
    assert!(matches!(next_run_time(&strategy, Utc::now(), None), Err(SchedulerError::InvalidTimezone(_))));
}

#[test]
fn cron_rejects_a_malformed_expression() {
    let strategy = ScheduleStrategy::Cron { expression: "not a cron expression".to_string(), timezone: "UTC".to_string() };
    assert!(matches!(validate(&strategy), Err(SchedulerError::InvalidCron { .. })));
}

#[test]
fn interval_first_fire_is_start_plus_interval() {
    let strategy = ScheduleStrategy::Interval { seconds: 60 };
    let now = at(2026, 1, 1, 0, 0, 0);
    let next = next_run_time(&strategy, now, None).unwrap().unwrap();
    assert_eq!(next, now + chrono::Duration::seconds(60));
}

#[test]
fn interval_subsequent_fire_is_relative_to_last_run() {
    let strategy = ScheduleStrategy::Interval { seconds: 60 };
    let last_run = at(2026, 1, 1, 0, 0, 0);
    let next = next_run_time(&strategy, last_run + chrono::Duration::seconds(30), Some(last_run)).unwrap().unwrap();
    assert_eq!(next, last_run + chrono::Duration::seconds(60));
}

#[test]
fn one_time_fires_once_then_never_again() {
    let at_instant = at(2026, 6, 1, 0, 0, 0);
    let strategy = ScheduleStrategy::OneTime { at: at_instant };

    let before = at_instant - chrono::Duration::seconds(1);
    assert_eq!(next_run_time(&strategy, before, None).unwrap(), Some(at_instant));
    assert_eq!(next_run_time(&strategy, before, Some(at_instant)).unwrap(), None);
}

#[test]
fn one_time_in_the_past_with_no_prior_run_never_fires() {
    let at_instant = at(2020, 1, 1, 0, 0, 0);
    let strategy = ScheduleStrategy::OneTime { at: at_instant };
    assert_eq!(next_run_time(&strategy, Utc::now(), None).unwrap(), None);
}

#[test]
fn event_and_dependency_strategies_are_never_time_driven() {
    let event = ScheduleStrategy::Event { event_type: "upload.complete".to_string(), event_source: "ingest".to_string(), filter: None };
    let dependency = ScheduleStrategy::Dependency { upstream: vec![], wait_for_all: true, trigger_on_success_only: true };
    assert_eq!(next_run_time(&event, Utc::now(), None).unwrap(), None);
    assert_eq!(next_run_time(&dependency, Utc::now(), None).unwrap(), None);
}
