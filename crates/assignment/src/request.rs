// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use oj_core::Capability;
use std::collections::HashSet;

/// Everything the assignment engine needs to know about the job being
/// dispatched. Constructed by the caller (the Coordinator, dispatching a job
/// claimed off the Queue) rather than stored on [`oj_core::Job`] itself —
/// zone/tag preferences are routing hints, not durable job state.
#[derive(Debug, Clone, Default)]
pub struct AssignmentRequest {
    pub workflow_id: String,
    pub required_capabilities: Vec<Capability>,
    /// Required robot `environment` tag; `None` means any environment matches.
    pub required_environment: Option<String>,
    /// Preferred zone for the proximity bonus (spec.md §4.2 zone/proximity bonus).
    pub preferred_zone: Option<String>,
    pub tag_preferences: HashSet<String>,
}

impl AssignmentRequest {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self { workflow_id: workflow_id.into(), ..Default::default() }
    }
}
