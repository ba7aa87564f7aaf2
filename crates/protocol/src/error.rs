// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised while decoding or validating a wire [`crate::Envelope`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    #[error("message exceeds max size of {max} bytes (got {got})")]
    TooLarge { max: usize, got: usize },

    #[error("payload missing required field `{0}`")]
    MissingField(&'static str),
}
