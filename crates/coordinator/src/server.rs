// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root for the fleet coordinator: the shared state every
//! connection handler closes over, plus the `axum` router that accepts new
//! WebSocket connections.

use crate::connection::handle_socket;
use crate::error::CoordinatorError;
use crate::events::{RobotFailedSender, ROBOT_FAILED_CHANNEL_CAPACITY};
use crate::pending::PendingAssignments;
use crate::registry::FleetRegistry;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use oj_core::{AssignmentConfig, CoordinatorConfig};
use oj_queue::Queue;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Shared state reachable from every connection task and the heartbeat
/// sweep. Cheap to clone (everything interior is an `Arc`/`DashMap`), but
/// components generally hold a single `Arc<Coordinator>`.
pub struct Coordinator {
    pub(crate) config: CoordinatorConfig,
    pub(crate) assignment_config: AssignmentConfig,
    pub(crate) queue: Queue,
    pub(crate) registry: FleetRegistry,
    pub(crate) pending: PendingAssignments,
    pub(crate) affinity: Mutex<oj_assignment::StateAffinityTracker>,
    pub(crate) robot_failed_tx: RobotFailedSender,
    pub(crate) shutdown: CancellationToken,
}

impl Coordinator {
    pub fn new(queue: Queue, config: CoordinatorConfig, assignment_config: AssignmentConfig) -> Arc<Self> {
        let (robot_failed_tx, _rx) = tokio::sync::broadcast::channel(ROBOT_FAILED_CHANNEL_CAPACITY);
        Arc::new(Self {
            config,
            assignment_config,
            queue,
            registry: FleetRegistry::new(),
            pending: PendingAssignments::new(),
            affinity: Mutex::new(oj_assignment::StateAffinityTracker::new()),
            robot_failed_tx,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn registry(&self) -> &FleetRegistry {
        &self.registry
    }

    /// Subscribe to robot failure notifications (Recovery Manager's only
    /// coupling point to the coordinator — spec.md §4.4).
    pub fn subscribe_robot_failed(&self) -> crate::events::RobotFailedReceiver {
        self.robot_failed_tx.subscribe()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn router(self: &Arc<Self>) -> Router {
        Router::new().route("/ws", get(ws_upgrade)).with_state(self.clone())
    }

    /// Bind and serve, running the heartbeat sweep alongside, until the
    /// coordinator's cancellation token fires.
    pub async fn serve(self: Arc<Self>) -> Result<(), CoordinatorError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!(%addr, "coordinator listening");

        let sweep_handle = tokio::spawn(crate::heartbeat::run_heartbeat_sweep(self.clone()));

        let app = self.router();
        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await?;

        sweep_handle.abort();
        Ok(())
    }
}

async fn ws_upgrade(State(coordinator): State<Arc<Coordinator>>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(coordinator, socket))
}
