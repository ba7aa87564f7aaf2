// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit log persistence (spec.md §6.5): every write chains to
//! the previous event's hash so the log can be verified end-to-end with
//! [`oj_core::audit::verify_chain`].

use crate::error::QueueError;
use crate::queue::Queue;
use chrono::Utc;
use oj_core::{AuditEntity, AuditEvent, AuditEventId};
use serde_json::Value as Json;
use sqlx::types::Json as SqlxJson;
use sqlx::Row;

/// Arbitrary fixed key for the advisory lock serializing `append_audit`
/// across concurrent callers so the hash chain can never fork.
const AUDIT_CHAIN_LOCK_KEY: i64 = 0x0a17_0d17;

impl Queue {
    /// Append one audit event, chaining it from the most recent event in
    /// the log (global order, not per-entity — the chain is meant to prove
    /// nothing was inserted, reordered, or dropped anywhere in the log).
    ///
    /// Holds a transaction-scoped advisory lock for the read-chain-insert
    /// sequence: without it, two concurrent writers could both read the
    /// same `prev_hash` and fork the chain.
    pub async fn append_audit(
        &self,
        entity: AuditEntity,
        entity_id: impl Into<String>,
        action: impl Into<String>,
        actor: impl Into<String>,
        detail: Json,
    ) -> Result<AuditEvent, QueueError> {
        let mut event = AuditEvent {
            id: AuditEventId::new(),
            entity,
            entity_id: entity_id.into(),
            action: action.into(),
            actor: actor.into(),
            detail,
            occurred_at: Utc::now(),
            hash: None,
            prev_hash: None,
        };

        let mut tx = self.pool.begin().await.map_err(QueueError::Db)?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(AUDIT_CHAIN_LOCK_KEY).execute(&mut *tx).await?;

        let prev_hash: Option<String> =
            sqlx::query_scalar("SELECT hash FROM audit_log ORDER BY occurred_at DESC, id DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?
                .flatten();
        event.chain(prev_hash);

        sqlx::query(
            r#"
            INSERT INTO audit_log (id, entity, entity_id, action, actor, detail, occurred_at, hash, prev_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.entity.to_string())
        .bind(&event.entity_id)
        .bind(&event.action)
        .bind(&event.actor)
        .bind(SqlxJson(&event.detail))
        .bind(event.occurred_at)
        .bind(&event.hash)
        .bind(&event.prev_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(QueueError::Db)?;
        Ok(event)
    }

    /// Events for one entity, oldest first, for an audit trail view.
    pub async fn audit_history(&self, entity: AuditEntity, entity_id: &str) -> Result<Vec<AuditEvent>, QueueError> {
        let rows = sqlx::query("SELECT * FROM audit_log WHERE entity = $1 AND entity_id = $2 ORDER BY occurred_at ASC")
            .bind(entity.to_string())
            .bind(entity_id)
            .fetch_all(self.pool())
            .await?;
        rows.iter().map(audit_event_from_row).collect()
    }

    /// The full log in insertion order, for chain verification or export.
    pub async fn audit_log(&self) -> Result<Vec<AuditEvent>, QueueError> {
        let rows = sqlx::query("SELECT * FROM audit_log ORDER BY occurred_at ASC, id ASC").fetch_all(self.pool()).await?;
        rows.iter().map(audit_event_from_row).collect()
    }
}

fn audit_event_from_row(row: &sqlx::postgres::PgRow) -> Result<AuditEvent, QueueError> {
    let entity_raw: String = row.try_get("entity")?;
    let detail: Json = row.try_get("detail")?;
    Ok(AuditEvent {
        id: AuditEventId::from_uuid(row.try_get("id")?),
        entity: parse_audit_entity(&entity_raw)?,
        entity_id: row.try_get("entity_id")?,
        action: row.try_get("action")?,
        actor: row.try_get("actor")?,
        detail,
        occurred_at: row.try_get("occurred_at")?,
        hash: row.try_get("hash")?,
        prev_hash: row.try_get("prev_hash")?,
    })
}

fn parse_audit_entity(raw: &str) -> Result<AuditEntity, QueueError> {
    match raw {
        "job" => Ok(AuditEntity::Job),
        "robot" => Ok(AuditEntity::Robot),
        "schedule" => Ok(AuditEntity::Schedule),
        "dlq_entry" => Ok(AuditEntity::DlqEntry),
        "api_key" => Ok(AuditEntity::ApiKey),
        other => Err(QueueError::Fatal(format!("unrecognized audit entity `{other}` in row"))),
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
