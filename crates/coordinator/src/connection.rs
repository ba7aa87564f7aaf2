// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection task: reads frames off one robot's WebSocket, routes them,
//! and forwards outbound frames queued onto its `mpsc` channel. One task per
//! connected robot, matching the coordinator's one-task-per-connection model
//! (spec.md §4.3 [ADD]).

use crate::events::RobotFailedReason;
use crate::server::Coordinator;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use oj_core::{Robot, RobotId, RobotMetrics, RobotStatus};
use oj_protocol::{Envelope, ErrorCode, Message};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

pub(crate) async fn handle_socket(coordinator: Arc<Coordinator>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Envelope>();

    let writer = tokio::spawn(async move {
        while let Some(envelope) = outbound_rx.recv().await {
            let json = match envelope.to_json() {
                Ok(json) => json,
                Err(error) => {
                    tracing::warn!(%error, "failed to encode outbound envelope");
                    continue;
                }
            };
            if sink.send(WsMessage::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut robot_id: Option<RobotId> = None;

    while let Some(Ok(frame)) = stream.next().await {
        let WsMessage::Text(text) = frame else { continue };
        if text.len() > coordinator.config.max_message_bytes {
            let _ = outbound_tx.send(Envelope::new(Message::Error {
                code: ErrorCode::MalformedMessage,
                message: "message exceeds max_message_bytes".to_string(),
            }));
            continue;
        }

        let envelope = match Envelope::from_json(&text) {
            Ok(envelope) => envelope,
            Err(error) => {
                let _ = outbound_tx
                    .send(Envelope::new(Message::Error { code: ErrorCode::MalformedMessage, message: error.to_string() }));
                continue;
            }
        };

        if robot_id.is_none() {
            match &envelope.message {
                Message::Register { robot_id: id, name, environment, capabilities, max_concurrent_jobs, api_key } => {
                    match register(&coordinator, id, name, environment, capabilities, *max_concurrent_jobs, api_key.as_deref(), outbound_tx.clone())
                        .await
                    {
                        Ok(()) => {
                            robot_id = Some(id.clone());
                            let _ = outbound_tx.send(Envelope::new(Message::RegisterAck { accepted: true, reason: None }));
                        }
                        Err(reason) => {
                            let _ = outbound_tx.send(Envelope::new(Message::RegisterAck { accepted: false, reason: Some(reason) }));
                        }
                    }
                }
                _ => {
                    let _ = outbound_tx.send(Envelope::new(Message::Error {
                        code: ErrorCode::ProtocolViolation,
                        message: "first message on a connection must be register".to_string(),
                    }));
                }
            }
            continue;
        }

        let Some(id) = robot_id.clone() else { continue };
        route(&coordinator, &id, envelope).await;
    }

    if let Some(id) = robot_id {
        disconnect(&coordinator, &id, RobotFailedReason::ConnectionClosed).await;
    }
    writer.abort();
}

#[allow(clippy::too_many_arguments)]
async fn register(
    coordinator: &Coordinator,
    robot_id: &RobotId,
    name: &str,
    environment: &str,
    capabilities: &[oj_core::Capability],
    max_concurrent_jobs: u32,
    api_key: Option<&str>,
    outbound: mpsc::UnboundedSender<Envelope>,
) -> Result<(), String> {
    if coordinator.config.api_key_required {
        let raw_key = api_key.ok_or("api_key is required")?;
        let valid = coordinator
            .queue
            .validate_api_key(robot_id.as_str(), raw_key)
            .await
            .map_err(|_| "credential validation failed".to_string())?;
        if !valid {
            return Err("invalid api key".to_string());
        }
    }

    let now = Utc::now();
    let robot = Robot {
        id: robot_id.clone(),
        name: name.to_string(),
        environment: environment.to_string(),
        capabilities: capabilities.to_vec(),
        max_concurrent_jobs,
        current_jobs: HashSet::new(),
        status: RobotStatus::Idle,
        tags: HashSet::new(),
        last_heartbeat_at: now,
        connected_at: now,
        metrics: RobotMetrics::default(),
    };
    coordinator.registry.register(robot, outbound);
    tracing::info!(robot_id = %robot_id, %environment, "robot registered");
    Ok(())
}

async fn route(coordinator: &Coordinator, robot_id: &RobotId, envelope: Envelope) {
    match envelope.message {
        Message::Heartbeat { robot_id: _, metrics } => {
            coordinator.registry.update_heartbeat(robot_id, metrics, Utc::now());
            coordinator.registry.send(robot_id, Envelope::new(Message::HeartbeatAck));
        }
        Message::JobAccept { job_id } => {
            if let Some(correlation_id) = envelope.correlation_id {
                coordinator.pending.resolve(&correlation_id, Message::JobAccept { job_id });
            }
        }
        Message::JobReject { job_id, reason } => {
            if let Some(correlation_id) = envelope.correlation_id {
                coordinator.pending.resolve(&correlation_id, Message::JobReject { job_id, reason });
            }
        }
        Message::JobProgress { job_id, progress_percent, progress_message } => {
            if let Err(error) = coordinator.queue.record_progress(job_id, robot_id, progress_percent, progress_message).await {
                tracing::warn!(%error, %job_id, "failed to record progress");
            }
        }
        Message::JobComplete { job_id, result } => {
            if let Err(error) = coordinator.queue.complete(job_id, robot_id, result).await {
                tracing::warn!(%error, %job_id, "failed to record completion");
            }
            coordinator.registry.release_job(robot_id, &job_id);
        }
        Message::JobFailed { job_id, error_message, error_traceback } => {
            if let Err(error) = coordinator.queue.fail(job_id, robot_id, &error_message, error_traceback).await {
                tracing::warn!(%error, %job_id, "failed to record failure");
            }
            coordinator.registry.release_job(robot_id, &job_id);
        }
        Message::LogEntry { job_id, line } => {
            tracing::info!(%job_id, %robot_id, "{line}");
        }
        Message::LogBatch { job_id, lines } => {
            for line in lines {
                tracing::info!(%job_id, %robot_id, "{line}");
            }
        }
        Message::StatusResponse { .. } => {}
        other => {
            tracing::debug!(kind = other.kind(), %robot_id, "unhandled message from robot");
        }
    }
}

async fn disconnect(coordinator: &Coordinator, robot_id: &RobotId, reason: RobotFailedReason) {
    let orphaned_jobs = coordinator.registry.get_robot(robot_id).map(|r| r.current_jobs.into_iter().collect()).unwrap_or_default();
    coordinator.registry.remove(robot_id);
    let _ = coordinator.robot_failed_tx.send(crate::events::RobotFailedEvent {
        robot_id: robot_id.clone(),
        reason,
        orphaned_jobs,
        occurred_at: Utc::now(),
    });
    tracing::info!(%robot_id, "robot disconnected");
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
