// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot↔coordinator message catalog (spec.md §4.3, §6.2).

use oj_core::{Capability, JobId, RobotId, RobotMetrics};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Stable machine-readable error codes carried by [`Message::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MalformedMessage,
    UnknownMessageType,
    Unauthorized,
    ProtocolViolation,
    UnknownJob,
    RateLimited,
}

/// Every message type exchanged between a robot and the fleet coordinator.
/// Adjacently tagged as `{"type": "...", "payload": {...}}` so it slots
/// directly into [`crate::Envelope`]'s flattened `type`/`payload` fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Message {
    /// Robot → coordinator: initial handshake.
    Register {
        robot_id: RobotId,
        name: String,
        environment: String,
        capabilities: Vec<Capability>,
        max_concurrent_jobs: u32,
        api_key: Option<String>,
    },
    /// Coordinator → robot: registration accepted.
    RegisterAck { accepted: bool, reason: Option<String> },

    /// Robot → coordinator: periodic vitals.
    Heartbeat { robot_id: RobotId, metrics: RobotMetrics },
    /// Coordinator → robot: heartbeat acknowledged.
    HeartbeatAck,

    /// Coordinator → robot: assign a job.
    JobAssign { job_id: JobId, workflow_json: Json, start_from_checkpoint: bool },
    /// Robot → coordinator: accepts the assignment.
    JobAccept { job_id: JobId },
    /// Robot → coordinator: declines the assignment (e.g. over capacity).
    JobReject { job_id: JobId, reason: String },

    /// Robot → coordinator: mid-run progress, also an implicit lease refresh.
    JobProgress { job_id: JobId, progress_percent: i32, progress_message: Option<String> },
    /// Robot → coordinator: job finished successfully.
    JobComplete { job_id: JobId, result: Json },
    /// Robot → coordinator: job finished with an error.
    JobFailed { job_id: JobId, error_message: String, error_traceback: Option<String> },
    /// Coordinator → robot: cancel an in-flight job.
    JobCancel { job_id: JobId },

    /// Robot → coordinator: a single log line.
    LogEntry { job_id: JobId, line: String },
    /// Robot → coordinator: a batch of log lines (reduces message volume).
    LogBatch { job_id: JobId, lines: Vec<String> },

    /// Coordinator → robot: request current status.
    StatusRequest,
    /// Robot → coordinator: status snapshot.
    StatusResponse { current_jobs: Vec<JobId>, metrics: RobotMetrics },

    /// Coordinator → robot: graceful shutdown request.
    Shutdown { grace_period_secs: u64 },
    /// Coordinator → robot: stop accepting new assignments.
    Pause,
    /// Coordinator → robot: resume accepting assignments.
    Resume,

    /// Either direction: a protocol-level error.
    Error { code: ErrorCode, message: String },
}

impl Message {
    /// The `type` discriminant as it appears on the wire, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Register { .. } => "register",
            Message::RegisterAck { .. } => "register_ack",
            Message::Heartbeat { .. } => "heartbeat",
            Message::HeartbeatAck => "heartbeat_ack",
            Message::JobAssign { .. } => "job_assign",
            Message::JobAccept { .. } => "job_accept",
            Message::JobReject { .. } => "job_reject",
            Message::JobProgress { .. } => "job_progress",
            Message::JobComplete { .. } => "job_complete",
            Message::JobFailed { .. } => "job_failed",
            Message::JobCancel { .. } => "job_cancel",
            Message::LogEntry { .. } => "log_entry",
            Message::LogBatch { .. } => "log_batch",
            Message::StatusRequest => "status_request",
            Message::StatusResponse { .. } => "status_response",
            Message::Shutdown { .. } => "shutdown",
            Message::Pause => "pause",
            Message::Resume => "resume",
            Message::Error { .. } => "error",
        }
    }
}
