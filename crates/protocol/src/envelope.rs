// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// The transport envelope every coordinator↔robot frame is wrapped in:
/// `{type, correlation_id?, payload}` (spec.md §6.2). `type`/`payload` are
/// supplied by [`Message`]'s adjacent tagging; `correlation_id` threads
/// request/response pairs (e.g. `job_assign` ⟷ `job_accept`/`job_reject`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub correlation_id: Option<String>,
}

impl Envelope {
    pub fn new(message: Message) -> Self {
        Self { message, correlation_id: None }
    }

    pub fn with_correlation_id(message: Message, correlation_id: impl Into<String>) -> Self {
        Self { message, correlation_id: Some(correlation_id.into()) }
    }

    pub fn to_json(&self) -> Result<String, crate::ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, crate::ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }
}
