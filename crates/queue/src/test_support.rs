// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only helpers for spinning up a `Queue` against a real Postgres
//! instance. Gated behind the `ORCH_TEST_DATABASE_URL` environment variable
//! so `cargo test` is green with no database available; integration
//! suites that need one call [`connect_or_skip`] first and return early
//! when it yields `None`.

use crate::Queue;
use oj_core::QueueConfig;
use sqlx::postgres::PgPoolOptions;

/// Connect to the database named by `ORCH_TEST_DATABASE_URL` and run
/// migrations, or return `None` if the variable is unset. Every migration
/// is applied to a fresh, uniquely-named schema-less database per test run
/// is out of scope here; callers are expected to point at a disposable
/// test database and truncate between runs.
pub async fn connect_or_skip() -> Option<Queue> {
    let url = std::env::var("ORCH_TEST_DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await.expect("connect to test database");
    sqlx::migrate!("./migrations").run(&pool).await.expect("run migrations");
    Some(Queue::new(pool, QueueConfig::default()))
}
