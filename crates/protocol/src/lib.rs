// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire protocol shared by the fleet coordinator and connecting robots, plus
//! the admin/query surface used by operational tooling (spec.md §4.3, §4.6,
//! §6.2).
//!
//! Robot-facing framing is an envelope `{type, correlation_id?, payload}`
//! carried over a JSON WebSocket message; admin queries use the same
//! tagged-enum convention the coordinator itself uses internally.

mod envelope;
mod error;
mod message;
mod query;
mod response;

pub use envelope::Envelope;
pub use error::ProtocolError;
pub use message::{ErrorCode, Message};
pub use query::Query;
pub use response::{QueueStatsSummary, Response, SlaStatus};
