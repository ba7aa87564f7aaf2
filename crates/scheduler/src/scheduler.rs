// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler's composition root (spec.md §4.5 scheduler loop): a single
//! cooperative tick task that fires time-driven schedules, plus
//! `trigger_event`/`notify_completion` entry points for event-driven and
//! dependency schedules. Cancellation follows the same
//! `tokio_util::sync::CancellationToken` convention as the coordinator's
//! heartbeat sweep and the recovery manager's run loop.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use oj_core::{JobId, JobSubmission, Schedule, ScheduleId, ScheduleStrategy, SchedulerConfig};
use oj_queue::Queue;
use parking_lot::Mutex;
use serde_json::Value as Json;
use std::time::Duration as StdDuration;
use tokio_util::sync::CancellationToken;

use crate::calendar::{BusinessCalendar, CalendarDenyPolicy};
use crate::catchup::plan_catch_up;
use crate::concurrency::{decide, ConcurrencyDecision};
use crate::dependency::DependencyTracker;
use crate::error::SchedulerError;
use crate::event_registry::EventRegistry;
use crate::next_run::next_run_time;
use crate::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::sla::{Execution, SlaMonitor};

/// Dependency-completion TTL: a dependency fires if its upstream completed
/// within this long. Past that, `notify_completion` is considered stale.
const DEPENDENCY_TTL_SECS: u64 = 24 * 3600;

pub struct Scheduler {
    queue: Queue,
    config: SchedulerConfig,
    calendars: DashMap<String, BusinessCalendar>,
    calendar_deny_policy: CalendarDenyPolicy,
    sla: SlaMonitor,
    rate_limiter: RateLimiter,
    dependencies: Mutex<DependencyTracker>,
    events: Mutex<EventRegistry>,
    in_flight: DashMap<ScheduleId, JobId>,
    dispatched_jobs: DashMap<JobId, ScheduleId>,
    last_fired_at: DashMap<ScheduleId, DateTime<Utc>>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(queue: Queue, config: SchedulerConfig) -> Self {
        Self {
            queue,
            config,
            calendars: DashMap::new(),
            calendar_deny_policy: CalendarDenyPolicy::Skip,
            sla: SlaMonitor::new(),
            rate_limiter: RateLimiter::new(),
            dependencies: Mutex::new(DependencyTracker::new()),
            events: Mutex::new(EventRegistry::new()),
            in_flight: DashMap::new(),
            dispatched_jobs: DashMap::new(),
            last_fired_at: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn register_calendar(&self, calendar: BusinessCalendar) {
        self.calendars.insert(calendar.id.clone(), calendar);
    }

    pub fn subscribe_sla_alerts(&self) -> crate::sla::SlaAlertReceiver {
        self.sla.subscribe()
    }

    /// Current SLA compliance for one schedule, or `None` if it has no
    /// `sla_config` or has not executed yet. Read-only; used by the admin
    /// query surface (spec.md §4.6 `GetSlaStatus`).
    pub fn sla_status(&self, schedule: &Schedule) -> Option<crate::sla::SlaStats> {
        self.sla.stats(schedule.id, schedule.sla_config.as_ref()?)
    }

    /// Register an event-driven schedule's subscription. Callers dispatch
    /// this once per `Event` strategy schedule at load time.
    pub fn subscribe_event(&self, schedule_id: ScheduleId, event_type: impl Into<String>, event_source: impl Into<String>, filter: Option<Json>) {
        self.events.lock().subscribe(schedule_id, event_type, event_source, filter);
    }

    /// Run the tick loop until cancelled. Performs a missed-run catch-up
    /// pass first (spec.md §4.5: "the orchestrator is expected to
    /// restart"), then ticks at `config.tick_interval_secs`.
    pub async fn run(&self) -> Result<(), SchedulerError> {
        self.catch_up(Utc::now()).await?;

        let mut ticker = tokio::time::interval(StdDuration::from_secs(self.config.tick_interval_secs.max(1)));
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("scheduler shutting down");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.tick(Utc::now()).await {
                        tracing::warn!(%err, "scheduler tick failed");
                    }
                }
            }
        }
    }

    /// Startup catch-up pass: for every enabled time-driven schedule whose
    /// `next_run_at` already fell due, apply `config.catch_up_policy`.
    async fn catch_up(&self, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        for schedule in self.queue.list_enabled_schedules().await? {
            if !schedule.strategy.is_time_driven() {
                continue;
            }
            let Some(next_run_at) = schedule.next_run_at else { continue };
            if next_run_at > now {
                continue;
            }

            let plan = plan_catch_up(&schedule.strategy, self.config.catch_up_policy, next_run_at, now)?;
            tracing::info!(schedule_id = %schedule.id, missed = plan.fires.len(), policy = %self.config.catch_up_policy, "replaying missed schedule fires");
            for fire_at in &plan.fires {
                self.dispatch(&schedule, *fire_at).await?;
            }
            self.queue.record_schedule_run(schedule.id, now, plan.next_run_at).await?;
        }
        Ok(())
    }

    /// One tick: collect due time-driven schedules and attempt to fire each.
    async fn tick(&self, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        for schedule in self.queue.list_enabled_schedules().await? {
            if !schedule.strategy.is_time_driven() {
                continue;
            }
            let Some(next_run_at) = schedule.next_run_at else { continue };
            if next_run_at > now {
                continue;
            }
            self.fire(&schedule, now).await?;
        }
        Ok(())
    }

    /// External entry point for event-driven schedules (spec.md §4.5).
    /// Returns the job ids enqueued for every matching, successfully-fired
    /// subscription.
    pub async fn trigger_event(&self, event_type: &str, event_source: &str, payload: Json) -> Result<Vec<JobId>, SchedulerError> {
        let matches = self.events.lock().matching(event_type, event_source, &payload);
        let mut fired = Vec::new();
        for schedule_id in matches {
            let Some(schedule) = self.queue.get_schedule(schedule_id).await? else { continue };
            if !schedule.enabled {
                continue;
            }
            if let Some(job_id) = self.fire(&schedule, Utc::now()).await? {
                fired.push(job_id);
            }
        }
        Ok(fired)
    }

    /// External entry point for dependency schedules and SLA bookkeeping:
    /// called when a dispatched job (or any upstream schedule's run,
    /// tracked by its job id) completes.
    pub async fn notify_completion(&self, job_id: JobId, succeeded: bool, completed_at: DateTime<Utc>) -> Result<Vec<JobId>, SchedulerError> {
        let Some((_, schedule_id)) = self.dispatched_jobs.remove(&job_id) else { return Ok(Vec::new()) };
        self.in_flight.remove(&schedule_id);

        if let Some(job) = self.queue.get_job(job_id).await? {
            if let Some(started_at) = job.started_at {
                if let Some(config) = self.queue.get_schedule(schedule_id).await?.and_then(|s| s.sla_config) {
                    self.sla.record(schedule_id, Execution { started_at, completed_at, succeeded }, Some(&config));
                }
            }
        }

        self.dependencies.lock().notify_completion(schedule_id, succeeded, completed_at);

        let mut fired = Vec::new();
        for schedule in self.queue.list_enabled_schedules().await? {
            let ScheduleStrategy::Dependency { upstream, wait_for_all, trigger_on_success_only } = &schedule.strategy else { continue };
            let satisfied = self.dependencies.lock().is_satisfied(upstream, *wait_for_all, *trigger_on_success_only, completed_at, DEPENDENCY_TTL_SECS);
            if satisfied {
                if let Some(new_job_id) = self.fire(&schedule, completed_at).await? {
                    fired.push(new_job_id);
                }
            }
        }
        Ok(fired)
    }

    /// Apply the calendar gate, concurrency policy, and rate limiter to a
    /// due fire, dispatching a job if every check passes. Time-driven
    /// schedules additionally advance `next_run_at`.
    async fn fire(&self, schedule: &Schedule, now: DateTime<Utc>) -> Result<Option<JobId>, SchedulerError> {
        if let Some(calendar_id) = &schedule.calendar_id {
            if let Some(calendar) = self.calendars.get(calendar_id) {
                if !calendar.can_execute(now, &schedule.workflow_id) {
                    return match self.calendar_deny_policy {
                        CalendarDenyPolicy::Skip => {
                            self.advance_time_driven(schedule, now).await?;
                            Ok(None)
                        }
                        CalendarDenyPolicy::AdvanceToNextWorkingTime => {
                            if schedule.strategy.is_time_driven() {
                                let deferred = calendar.next_working_time(now, &schedule.workflow_id);
                                self.queue.record_schedule_run(schedule.id, schedule.last_run_at.unwrap_or(now), deferred).await?;
                            }
                            Ok(None)
                        }
                    };
                }
            }
        }

        let in_flight = self.in_flight.contains_key(&schedule.id);
        match decide(schedule.concurrency_policy, in_flight, self.last_fired_at.get(&schedule.id).map(|e| *e), now) {
            ConcurrencyDecision::Skip => {
                self.advance_time_driven(schedule, now).await?;
                return Ok(None);
            }
            ConcurrencyDecision::ReplaceInFlight => {
                if let Some((_, stale_job_id)) = self.in_flight.remove(&schedule.id) {
                    let _ = self.queue.cancel(stale_job_id).await;
                    self.dispatched_jobs.remove(&stale_job_id);
                }
            }
            ConcurrencyDecision::Proceed => {}
        }

        if let Some(rate_limit) = &schedule.rate_limit {
            if matches!(self.rate_limiter.try_acquire(schedule.id, rate_limit, now), RateLimitDecision::Reject { .. }) {
                self.advance_time_driven(schedule, now).await?;
                return Ok(None);
            }
        }

        Ok(Some(self.dispatch(schedule, now).await?))
    }

    /// Unconditionally enqueue a job for `schedule` and record the
    /// in-memory bookkeeping the concurrency/dependency/SLA logic relies on.
    async fn dispatch(&self, schedule: &Schedule, now: DateTime<Utc>) -> Result<JobId, SchedulerError> {
        let submission = JobSubmission::builder(schedule.workflow_id.clone(), Json::Object(Default::default())).priority(schedule.priority).build();
        let job_id = self.queue.enqueue(submission).await?;

        self.in_flight.insert(schedule.id, job_id);
        self.dispatched_jobs.insert(job_id, schedule.id);
        self.last_fired_at.insert(schedule.id, now);

        if schedule.strategy.is_time_driven() {
            let next = next_run_time(&schedule.strategy, now, Some(now))?;
            self.queue.record_schedule_run(schedule.id, now, next).await?;
        }

        tracing::info!(schedule_id = %schedule.id, %job_id, "schedule fired");
        Ok(job_id)
    }

    /// When a fire is skipped (calendar/concurrency/rate-limit denial) a
    /// time-driven schedule must still advance past the slot it just missed,
    /// or it would spin on the same due `next_run_at` every tick.
    async fn advance_time_driven(&self, schedule: &Schedule, now: DateTime<Utc>) -> Result<(), SchedulerError> {
        if !schedule.strategy.is_time_driven() {
            return Ok(());
        }
        let next = next_run_time(&schedule.strategy, now, schedule.next_run_at)?;
        self.queue.record_schedule_run(schedule.id, schedule.last_run_at.unwrap_or(now), next).await?;
        Ok(())
    }

    pub fn set_calendar_deny_policy(&mut self, policy: CalendarDenyPolicy) {
        self.calendar_deny_policy = policy;
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
