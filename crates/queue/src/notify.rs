// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PostgreSQL `LISTEN/NOTIFY` wake-up for the coordinator's claim loop, with
//! a polling fallback (spec.md §4.1 "DB notification").

use crate::error::QueueError;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::time::Duration;

/// Wraps a `PgListener` subscribed to the queue's notify channel. Each
/// `recv` resolves when either a notification arrives or the configured
/// poll interval elapses, whichever is first — so a coordinator that relies
/// solely on this never misses a `requeue_stale`-released job, even if the
/// `NOTIFY` itself is dropped by a connection hiccup.
pub struct NotifyListener {
    listener: PgListener,
    poll_interval: Duration,
}

impl NotifyListener {
    pub async fn connect(pool: &PgPool, channel: &str, poll_interval: Duration) -> Result<Self, QueueError> {
        let mut listener = PgListener::connect_with(pool).await.map_err(QueueError::Db)?;
        listener.listen(channel).await.map_err(QueueError::Db)?;
        Ok(Self { listener, poll_interval })
    }

    /// Wait for the next wake-up: a real notification, or the poll interval
    /// expiring. Returns [`PollOrNotify`] so callers can distinguish the two
    /// for backoff/metrics purposes without changing their claim logic.
    pub async fn recv(&mut self) -> PollOrNotify {
        match tokio::time::timeout(self.poll_interval, self.listener.recv()).await {
            Ok(Ok(_notification)) => PollOrNotify::Notified,
            Ok(Err(_)) => PollOrNotify::ListenerLost,
            Err(_) => PollOrNotify::PollTick,
        }
    }
}

/// Why a [`NotifyListener::recv`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOrNotify {
    /// A `NOTIFY` arrived on the channel — likely new work.
    Notified,
    /// The poll interval elapsed with no notification; caller should poll
    /// `claim` anyway, since notifications are advisory, not authoritative.
    PollTick,
    /// The underlying connection was lost; caller should reconnect.
    ListenerLost,
}
