// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Correlates an outbound `job_assign` with the robot's eventual
//! `job_accept`/`job_reject` reply (spec.md §4.3 assignment flow).

use dashmap::DashMap;
use oj_protocol::Message;
use tokio::sync::oneshot;

#[derive(Default)]
pub struct PendingAssignments {
    inflight: DashMap<String, oneshot::Sender<Message>>,
}

impl PendingAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new correlation id and return the receiver half the
    /// dispatcher awaits on.
    pub fn begin(&self, correlation_id: String) -> oneshot::Receiver<Message> {
        let (tx, rx) = oneshot::channel();
        self.inflight.insert(correlation_id, tx);
        rx
    }

    /// Resolve a pending assignment with the robot's reply. A missing
    /// correlation id means the dispatcher already timed out and moved on;
    /// this is a no-op rather than an error.
    pub fn resolve(&self, correlation_id: &str, message: Message) {
        if let Some((_, tx)) = self.inflight.remove(correlation_id) {
            let _ = tx.send(message);
        }
    }

    /// Drop a correlation id without resolving it (dispatcher gave up).
    pub fn cancel(&self, correlation_id: &str) {
        self.inflight.remove(correlation_id);
    }
}
