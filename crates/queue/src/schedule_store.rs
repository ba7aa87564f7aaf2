// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for `Schedule` rows (spec.md §3.3, §6.1). The scheduler
//! crate owns the in-memory tick/policy logic; this is just the durable
//! store behind it, following the same row-mapping shape as `row.rs`.

use crate::error::QueueError;
use crate::queue::Queue;
use chrono::{DateTime, Utc};
use oj_core::{ConcurrencyPolicy, RateLimitConfig, Schedule, ScheduleId, ScheduleStrategy, SlaConfig};
use sqlx::postgres::PgRow;
use sqlx::types::Json as SqlxJson;
use sqlx::Row;

impl Queue {
    /// Insert a new schedule row.
    pub async fn create_schedule(&self, schedule: &Schedule) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO schedules
                (id, workflow_id, strategy, enabled, calendar_id, sla_config, rate_limit,
                 priority, last_run_at, next_run_at, concurrency_policy)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(schedule.id.as_uuid())
        .bind(&schedule.workflow_id)
        .bind(SqlxJson(&schedule.strategy))
        .bind(schedule.enabled)
        .bind(&schedule.calendar_id)
        .bind(schedule.sla_config.map(SqlxJson))
        .bind(schedule.rate_limit.map(SqlxJson))
        .bind(schedule.priority)
        .bind(schedule.last_run_at)
        .bind(schedule.next_run_at)
        .bind(SqlxJson(schedule.concurrency_policy))
        .execute(self.pool())
        .await?;
        Ok(())
    }

    /// All enabled schedules, for the tick loop's startup load and periodic
    /// refresh.
    pub async fn list_enabled_schedules(&self) -> Result<Vec<Schedule>, QueueError> {
        let rows = sqlx::query("SELECT * FROM schedules WHERE enabled ORDER BY priority DESC").fetch_all(self.pool()).await?;
        rows.iter().map(schedule_from_row).collect()
    }

    /// Every schedule regardless of `enabled`, for the admin surface's
    /// `ListSchedules` (spec.md §4.6) — unlike `list_enabled_schedules`,
    /// disabled schedules stay visible for operators to re-enable.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, QueueError> {
        let rows = sqlx::query("SELECT * FROM schedules ORDER BY priority DESC").fetch_all(self.pool()).await?;
        rows.iter().map(schedule_from_row).collect()
    }

    pub async fn get_schedule(&self, id: ScheduleId) -> Result<Option<Schedule>, QueueError> {
        let row = sqlx::query("SELECT * FROM schedules WHERE id = $1").bind(id.as_uuid()).fetch_optional(self.pool()).await?;
        row.as_ref().map(schedule_from_row).transpose()
    }

    /// Record a tick's dispatch: the run just taken and the next scheduled
    /// fire time (`None` for one-shot/event-driven schedules that just fired
    /// their only or a non-deterministic occurrence).
    pub async fn record_schedule_run(
        &self,
        id: ScheduleId,
        last_run_at: DateTime<Utc>,
        next_run_at: Option<DateTime<Utc>>,
    ) -> Result<(), QueueError> {
        sqlx::query("UPDATE schedules SET last_run_at = $2, next_run_at = $3 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(last_run_at)
            .bind(next_run_at)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    pub async fn set_schedule_enabled(&self, id: ScheduleId, enabled: bool) -> Result<(), QueueError> {
        sqlx::query("UPDATE schedules SET enabled = $2 WHERE id = $1").bind(id.as_uuid()).bind(enabled).execute(self.pool()).await?;
        Ok(())
    }
}

fn schedule_from_row(row: &PgRow) -> Result<Schedule, QueueError> {
    let strategy: SqlxJson<ScheduleStrategy> = row.try_get("strategy")?;
    let sla_config: Option<SqlxJson<SlaConfig>> = row.try_get("sla_config")?;
    let rate_limit: Option<SqlxJson<RateLimitConfig>> = row.try_get("rate_limit")?;
    let concurrency_policy: SqlxJson<ConcurrencyPolicy> = row.try_get("concurrency_policy")?;

    Ok(Schedule {
        id: ScheduleId::from_uuid(row.try_get("id")?),
        workflow_id: row.try_get("workflow_id")?,
        strategy: strategy.0,
        enabled: row.try_get("enabled")?,
        calendar_id: row.try_get("calendar_id")?,
        sla_config: sla_config.map(|j| j.0),
        rate_limit: rate_limit.map(|j| j.0),
        priority: row.try_get("priority")?,
        last_run_at: row.try_get("last_run_at")?,
        next_run_at: row.try_get("next_run_at")?,
        concurrency_policy: concurrency_policy.0,
    })
}

#[cfg(test)]
#[path = "schedule_store_tests.rs"]
mod tests;
