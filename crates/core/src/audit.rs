// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Audit log event model with optional hash chain (spec.md §6.5, §9).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use sha2::{Digest, Sha256};

crate::define_uuid_id! {
    /// Unique identifier for an audit event.
    pub struct AuditEventId;
}

/// The category of entity an audit event pertains to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntity {
    Job,
    Robot,
    Schedule,
    DlqEntry,
    ApiKey,
}

crate::simple_display! {
    AuditEntity {
        Job => "job",
        Robot => "robot",
        Schedule => "schedule",
        DlqEntry => "dlq_entry",
        ApiKey => "api_key",
    }
}

/// A single, append-only audit log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: AuditEventId,
    pub entity: AuditEntity,
    pub entity_id: String,
    pub action: String,
    pub actor: String,
    pub detail: Json,
    pub occurred_at: DateTime<Utc>,
    /// Hex-encoded SHA-256 of this event chained to the previous event's hash.
    /// `None` until [`AuditEvent::chain`] is called by the writer.
    pub hash: Option<String>,
    pub prev_hash: Option<String>,
}

impl AuditEvent {
    /// Canonical bytes hashed into the chain: stable field order, independent
    /// of `hash`/`prev_hash` themselves so the chain cannot hash its own tail.
    fn canonical_bytes(&self) -> Vec<u8> {
        let canonical = serde_json::json!({
            "id": self.id.to_string(),
            "entity": self.entity.to_string(),
            "entity_id": self.entity_id,
            "action": self.action,
            "actor": self.actor,
            "detail": self.detail,
            "occurred_at": self.occurred_at.to_rfc3339(),
        });
        canonical.to_string().into_bytes()
    }

    /// Compute and store this event's hash, chained from `prev_hash`.
    pub fn chain(&mut self, prev_hash: Option<String>) {
        let mut hasher = Sha256::new();
        if let Some(prev) = &prev_hash {
            hasher.update(prev.as_bytes());
        }
        hasher.update(self.canonical_bytes());
        self.prev_hash = prev_hash;
        self.hash = Some(hex_encode(&hasher.finalize()));
    }

    /// Recompute the hash from this event's own fields and `prev_hash`,
    /// returning whether it matches the stored `hash`.
    pub fn verify(&self) -> bool {
        let Some(expected) = &self.hash else { return false };
        let mut hasher = Sha256::new();
        if let Some(prev) = &self.prev_hash {
            hasher.update(prev.as_bytes());
        }
        hasher.update(self.canonical_bytes());
        &hex_encode(&hasher.finalize()) == expected
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

/// Verify an ordered chain of audit events, returning the index of the first
/// break (tampering, reordering, or a missing link), if any.
pub fn verify_chain(events: &[AuditEvent]) -> Result<(), usize> {
    let mut prev: Option<&str> = None;
    for (idx, event) in events.iter().enumerate() {
        if !event.verify() {
            return Err(idx);
        }
        if event.prev_hash.as_deref() != prev {
            return Err(idx);
        }
        prev = event.hash.as_deref();
    }
    Ok(())
}

/// Merkle root over a chain's event hashes, for compact external anchoring.
pub fn merkle_root(events: &[AuditEvent]) -> Option<String> {
    let mut level: Vec<String> = events.iter().filter_map(|e| e.hash.clone()).collect();
    if level.is_empty() {
        return None;
    }
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let mut hasher = Sha256::new();
            hasher.update(pair[0].as_bytes());
            hasher.update(pair.get(1).unwrap_or(&pair[0]).as_bytes());
            next.push(hex_encode(&hasher.finalize()));
        }
        level = next;
    }
    level.into_iter().next()
}

crate::builder! {
    pub struct AuditEventBuilder => AuditEvent {
        into {
            entity_id: String = "job-1",
            action: String = "created",
            actor: String = "system",
        }
        set {
            entity: AuditEntity = AuditEntity::Job,
            detail: Json = Json::Object(Default::default()),
            hash: Option<String> = None,
            prev_hash: Option<String> = None,
        }
        computed {
            id: AuditEventId = AuditEventId::new(),
            occurred_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
