// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription registry for event-driven schedules (spec.md §4.5). An
//! event-driven schedule's `next_run_time` is always `None`; instead it
//! registers here on `(event_type, event_source)` and the scheduler calls
//! [`EventRegistry::matching`] from its `trigger_event` entry point.

use oj_core::ScheduleId;
use serde_json::Value as Json;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Subscription {
    schedule_id: ScheduleId,
    filter: Option<Json>,
}

#[derive(Debug, Clone, Default)]
pub struct EventRegistry {
    subscriptions: HashMap<(String, String), Vec<Subscription>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, schedule_id: ScheduleId, event_type: impl Into<String>, event_source: impl Into<String>, filter: Option<Json>) {
        self.subscriptions.entry((event_type.into(), event_source.into())).or_default().push(Subscription { schedule_id, filter });
    }

    pub fn unsubscribe_schedule(&mut self, schedule_id: ScheduleId) {
        self.subscriptions.retain(|_, subs| {
            subs.retain(|s| s.schedule_id != schedule_id);
            !subs.is_empty()
        });
    }

    /// Every schedule whose subscription on `(event_type, event_source)`
    /// matches `payload` (a subscription with no filter matches
    /// unconditionally; one with a filter requires every key in the filter
    /// object to be present with an equal value in `payload`).
    pub fn matching(&self, event_type: &str, event_source: &str, payload: &Json) -> Vec<ScheduleId> {
        self.subscriptions
            .get(&(event_type.to_string(), event_source.to_string()))
            .into_iter()
            .flatten()
            .filter(|sub| filter_matches(sub.filter.as_ref(), payload))
            .map(|sub| sub.schedule_id)
            .collect()
    }
}

fn filter_matches(filter: Option<&Json>, payload: &Json) -> bool {
    let Some(filter) = filter else { return true };
    let Some(filter_obj) = filter.as_object() else { return true };
    let Some(payload_obj) = payload.as_object() else { return false };
    filter_obj.iter().all(|(key, expected)| payload_obj.get(key) == Some(expected))
}

#[cfg(test)]
#[path = "event_registry_tests.rs"]
mod tests;
