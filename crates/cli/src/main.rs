// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj`: operator CLI for the durable parts of the admin/query surface
//! (spec.md §4.6). Connects straight to Postgres rather than to a live
//! daemon process — the admin surface's wire transport is explicitly out
//! of scope per spec.md, and queue/DLQ/schedule state is the durable
//! subset of that surface a standalone tool can read honestly. Live,
//! in-memory-only state (the connected fleet, SLA windows) belongs to a
//! running `orchestratord` process and is exposed there, not here — see
//! DESIGN.md.

use anyhow::Context;
use clap::{Parser, Subcommand};
use oj_core::{DlqId, JobId, JobStatus, QueueConfig, ScheduleId};
use oj_queue::{PeekFilter, Queue};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "oj", about = "Operator CLI for the orchestrator's durable queue state")]
struct Cli {
    /// Postgres connection string. Falls back to `ORCH_DATABASE_URL`, then
    /// the same default as the daemon.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue depth and throughput (spec.md §4.1 `stats`).
    QueueStats,

    /// List jobs, optionally filtered by status/workflow.
    Peek {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        workflow: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Dead-letter queue inspection and replay.
    #[command(subcommand)]
    Dlq(DlqCommand),

    /// Schedule inspection.
    #[command(subcommand)]
    Schedules(ScheduleCommand),
}

#[derive(Subcommand)]
enum DlqCommand {
    /// Most recently dead-lettered entries first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Re-enqueue a dead-lettered entry by its dlq id.
    Replay { dlq_id: String },
    /// Re-enqueue whichever dlq entry belongs to a given original job id.
    ReplayJob { job_id: String },
}

#[derive(Subcommand)]
enum ScheduleCommand {
    /// Every configured schedule, enabled or not.
    List,
    /// A single schedule's full detail.
    Get { schedule_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let database_url = cli
        .database_url
        .or_else(|| std::env::var("ORCH_DATABASE_URL").ok())
        .unwrap_or_else(|| "postgres://localhost/orchestrator".to_string());
    let queue = Queue::connect(&database_url, QueueConfig::default()).await.context("connecting to the orchestrator database")?;

    match cli.command {
        Command::QueueStats => {
            let stats = queue.stats().await?;
            let throughput = queue.completions_last_minute().await?;
            print_json(&serde_json::json!({
                "pending": stats.pending,
                "running": stats.running,
                "completed": stats.completed,
                "failed": stats.failed,
                "cancelled": stats.cancelled,
                "dlq": stats.dlq,
                "oldest_pending_age_secs": stats.oldest_pending_age_secs,
                "completions_last_minute": throughput,
            }));
        }

        Command::Peek { status, workflow, limit } => {
            let filter = PeekFilter { status: status.as_deref().map(parse_status).transpose()?, workflow_id: workflow, limit };
            let jobs = queue.peek(&filter).await?;
            print_json(&jobs);
        }

        Command::Dlq(DlqCommand::List { limit }) => {
            let entries = queue.list_dlq(limit as i64).await?;
            print_json(&entries);
        }

        Command::Dlq(DlqCommand::Replay { dlq_id }) => {
            let dlq_id = DlqId::from_uuid(parse_uuid(&dlq_id)?);
            let new_job_id = queue.replay_dlq(dlq_id).await?;
            println!("replayed as job {new_job_id}");
        }

        Command::Dlq(DlqCommand::ReplayJob { job_id }) => {
            let job_id = JobId::from_uuid(parse_uuid(&job_id)?);
            let entry = queue.find_dlq_by_job(job_id).await?.with_context(|| format!("no dlq entry for job {job_id}"))?;
            let new_job_id = queue.replay_dlq(entry.id).await?;
            println!("replayed as job {new_job_id}");
        }

        Command::Schedules(ScheduleCommand::List) => {
            let schedules = queue.list_schedules().await?;
            print_json(&schedules);
        }

        Command::Schedules(ScheduleCommand::Get { schedule_id }) => {
            let schedule_id = ScheduleId::from_uuid(parse_uuid(&schedule_id)?);
            let schedule = queue.get_schedule(schedule_id).await?.with_context(|| format!("no schedule {schedule_id}"))?;
            print_json(&schedule);
        }
    }

    Ok(())
}

fn parse_uuid(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("`{raw}` is not a valid id"))
}

fn parse_status(raw: &str) -> anyhow::Result<JobStatus> {
    match raw {
        "pending" => Ok(JobStatus::Pending),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        "cancelled" => Ok(JobStatus::Cancelled),
        other => anyhow::bail!("unknown status `{other}`"),
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(error) => eprintln!("failed to render response: {error}"),
    }
}
