// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions.
//!
//! Two families of identifier are used across the orchestrator:
//!
//! - UUID-backed ids ([`define_uuid_id!`]) for rows that live in Postgres
//!   (`job_id`, `schedule_id`, `dlq_id`) — the database's native `UUID`
//!   column type round-trips through `sqlx` without conversion.
//! - Opaque string ids ([`define_string_id!`]) for externally supplied
//!   identifiers such as `robot_id`, which a robot chooses for itself on
//!   registration and which the orchestrator never generates.

use uuid::Uuid;

/// Define a newtype ID wrapper around [`uuid::Uuid`].
///
/// Generates `new()` for random ID generation, `from_uuid()`/`as_uuid()`,
/// `Display`, `From<Uuid>`, and the `sqlx` transparent (de)serialization
/// via `#[serde(transparent)]` plus `sqlx::Type`.
///
/// ```ignore
/// define_uuid_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId;
/// }
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random (v4) id.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID (e.g. parsed from a request or a DB row).
            pub fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }

            /// The underlying UUID value.
            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(uuid::Uuid::parse_str(s)?))
            }
        }
    };
}

/// Define a newtype ID wrapper around an opaque `String`.
///
/// Used for identifiers supplied by an external party (a connecting robot
/// chooses its own `robot_id`) rather than generated by the orchestrator.
///
/// ```ignore
/// define_string_id! {
///     pub struct RobotId;
/// }
/// ```
#[macro_export]
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Smallest UUID that still sorts before all v4 UUIDs with the same
/// timestamp-less randomness; used only in tests needing a stable nil id.
pub fn nil_uuid() -> Uuid {
    Uuid::nil()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
