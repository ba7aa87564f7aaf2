use super::*;
use chrono::TimeZone;

fn business_hours_calendar() -> BusinessCalendar {
    BusinessCalendar {
        id: "business-hours".to_string(),
        timezone: chrono_tz::UTC,
        working_days: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri].into_iter().collect(),
        working_hours: (NaiveTime::from_hms_opt(9, 0, 0).unwrap(), NaiveTime::from_hms_opt(17, 0, 0).unwrap()),
        holidays: [NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()].into_iter().collect(),
        blackouts: Vec::new(),
        workflow_exceptions: HashSet::new(),
    }
}

#[test]
fn always_open_permits_any_instant() {
    let calendar = BusinessCalendar::always_open("default");
    assert!(calendar.can_execute(Utc.with_ymd_and_hms(2026, 1, 4, 3, 0, 0).unwrap(), "wf-1"));
}

#[test]
fn denies_outside_working_hours() {
    let calendar = business_hours_calendar();
    // A Monday, but at 03:00.
    assert!(!calendar.can_execute(Utc.with_ymd_and_hms(2026, 1, 5, 3, 0, 0).unwrap(), "wf-1"));
    assert!(calendar.can_execute(Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap(), "wf-1"));
}

#[test]
fn denies_weekends() {
    let calendar = business_hours_calendar();
    // 2026-01-03 is a Saturday.
    assert!(!calendar.can_execute(Utc.with_ymd_and_hms(2026, 1, 3, 10, 0, 0).unwrap(), "wf-1"));
}

#[test]
fn denies_holidays() {
    let calendar = business_hours_calendar();
    assert!(!calendar.can_execute(Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap(), "wf-1"));
}

#[test]
fn denies_blackout_windows() {
    let mut calendar = business_hours_calendar();
    let start = Utc.with_ymd_and_hms(2026, 1, 5, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 1, 5, 12, 0, 0).unwrap();
    calendar.blackouts.push((start, end));
    assert!(!calendar.can_execute(start + Duration::minutes(30), "wf-1"));
    assert!(calendar.can_execute(end + Duration::minutes(1), "wf-1"));
}

#[test]
fn workflow_exceptions_bypass_every_other_rule() {
    let mut calendar = business_hours_calendar();
    calendar.workflow_exceptions.insert("always-on-healthcheck".to_string());
    assert!(calendar.can_execute(Utc.with_ymd_and_hms(2026, 1, 3, 3, 0, 0).unwrap(), "always-on-healthcheck"));
}

#[test]
fn next_working_time_advances_past_a_weekend() {
    let calendar = business_hours_calendar();
    // 2026-01-03 is a Saturday; scheduler should advance to Monday 09:00.
    let from = Utc.with_ymd_and_hms(2026, 1, 3, 10, 0, 0).unwrap();
    let next = calendar.next_working_time(from, "wf-1").unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap());
}
