// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot API-key credential store (spec.md §6.1 `api_keys`, §7 authorization
//! errors). Only a salted hash is ever persisted; raw keys never touch the
//! database or the logs — audit events carry the key prefix only.

use crate::error::QueueError;
use crate::queue::Queue;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("api key is too short to be valid")]
    TooShort,
}

const PREFIX_LEN: usize = 8;

/// Generate a fresh random key and its storable form. Returns `(raw_key,
/// salted_hash)` where `salted_hash` is `"{salt}${hex_hash}"` — the format
/// persisted in the `api_keys.salted_hash` column. The raw key is handed to
/// the robot exactly once and never stored.
pub fn generate_api_key() -> (String, String) {
    let raw = random_token(32);
    let salt = random_token(16);
    let hash = hash_api_key(&raw, &salt);
    (raw, format!("{salt}${hash}"))
}

fn random_token(bytes: usize) -> String {
    (0..bytes).map(|_| format!("{:02x}", fastrand::u8(..))).collect()
}

/// `hex(sha256(salt || raw))`.
pub fn hash_api_key(raw: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(raw.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Constant-time comparison of a freshly computed hash against the stored
/// one, so key validation does not leak timing information about how many
/// leading bytes matched (spec.md §7 authorization error handling).
pub fn verify_api_key(raw: &str, salt: &str, expected_hash: &str) -> bool {
    let computed = hash_api_key(raw, salt);
    constant_time_eq(computed.as_bytes(), expected_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// The first [`PREFIX_LEN`] characters of a raw key, safe to log/audit.
pub fn key_prefix(raw: &str) -> &str {
    let end = raw.len().min(PREFIX_LEN);
    &raw[..end]
}

impl Queue {
    /// Validate a robot's registration credential against the `api_keys`
    /// table (spec.md §6.2 registration, §7 authorization error). A
    /// revoked or unknown key fails closed.
    pub async fn validate_api_key(&self, robot_id: &str, raw_key: &str) -> Result<bool, QueueError> {
        if raw_key.len() < PREFIX_LEN {
            return Ok(false);
        }
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT key_prefix, salted_hash FROM api_keys WHERE robot_id = $1 AND revoked_at IS NULL",
        )
        .bind(robot_id)
        .fetch_all(self.pool())
        .await?;

        // salt isn't stored as a separate column in the schema's minimal
        // representation — salted_hash embeds the salt as its own prefix,
        // matching the teacher's embedded-salt convention for secret hashes.
        for (_, salted_hash) in rows {
            if let Some((salt, hash)) = salted_hash.split_once('$') {
                if verify_api_key(raw_key, salt, hash) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut acc, b| {
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
#[path = "api_keys_tests.rs"]
mod tests;
