use super::*;
use serde_json::json;

#[test]
fn matches_a_subscription_with_no_filter() {
    let mut registry = EventRegistry::new();
    let schedule_id = ScheduleId::new();
    registry.subscribe(schedule_id, "upload.complete", "ingest", None);

    let hits = registry.matching("upload.complete", "ingest", &json!({"bucket": "raw"}));
    assert_eq!(hits, vec![schedule_id]);
}

#[test]
fn filter_requires_every_key_to_match() {
    let mut registry = EventRegistry::new();
    let schedule_id = ScheduleId::new();
    registry.subscribe(schedule_id, "upload.complete", "ingest", Some(json!({"bucket": "raw", "region": "us"})));

    assert!(registry.matching("upload.complete", "ingest", &json!({"bucket": "raw", "region": "us"})).contains(&schedule_id));
    assert!(registry.matching("upload.complete", "ingest", &json!({"bucket": "raw", "region": "eu"})).is_empty());
}

#[test]
fn unrelated_event_type_or_source_does_not_match() {
    let mut registry = EventRegistry::new();
    let schedule_id = ScheduleId::new();
    registry.subscribe(schedule_id, "upload.complete", "ingest", None);

    assert!(registry.matching("upload.failed", "ingest", &json!({})).is_empty());
    assert!(registry.matching("upload.complete", "other-source", &json!({})).is_empty());
}

#[test]
fn unsubscribe_schedule_removes_it_from_every_subscription() {
    let mut registry = EventRegistry::new();
    let schedule_id = ScheduleId::new();
    registry.subscribe(schedule_id, "upload.complete", "ingest", None);
    registry.unsubscribe_schedule(schedule_id);

    assert!(registry.matching("upload.complete", "ingest", &json!({})).is_empty());
}
