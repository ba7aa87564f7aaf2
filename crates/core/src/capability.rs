// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Robot capability tokens and semver-aware matching.
//!
//! A capability is a declared ability of a robot, optionally versioned
//! (`browser:1.0`). A job's required capability `c[:vreq]` is satisfied by a
//! robot's present capability `c[:vhave]` when `vhave >= vreq`; a missing
//! version on either side is treated as an unconditional match.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single capability token, e.g. `"ocr"` or `"ocr:2.0"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Capability {
    pub name: String,
    pub version: Option<Version>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), version: None }
    }

    pub fn with_version(name: impl Into<String>, version: Version) -> Self {
        Self { name: name.into(), version: Some(version) }
    }

    /// Whether `self` (a robot's advertised capability) satisfies `required`
    /// (a job's required capability). Deterministic, no I/O.
    pub fn satisfies(&self, required: &Capability) -> bool {
        if self.name != required.name {
            return false;
        }
        match (&required.version, &self.version) {
            (Some(req), Some(have)) => have >= req,
            // Missing version on either side is an unconditional match.
            _ => true,
        }
    }
}

/// Parse a raw `name[:semver]` token. Best-effort: a version string that
/// fails to parse as semver (even after [`normalize_version`] padding) is
/// treated as an unversioned capability rather than a hard error, since
/// robots are free-form in what they advertise.
impl FromStr for Capability {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, ver)) => match Version::parse(&normalize_version(ver)) {
                Ok(v) => Ok(Capability::with_version(name, v)),
                Err(_) => Ok(Capability::new(s)),
            },
            None => Ok(Capability::new(s)),
        }
    }
}

/// Pad a version string out to the `MAJOR.MINOR.PATCH` triple `semver::Version`
/// requires. spec.md's own capability tokens (`ocr:2.0`, `browser:1.0`,
/// `ocr:1.5`) are two-component; rejecting those outright would fall back to
/// treating the whole `"name:version"` token as an opaque name, breaking
/// semver comparison for the exact format the spec uses throughout §3.2.
fn normalize_version(ver: &str) -> String {
    match ver.matches('.').count() {
        0 => format!("{ver}.0.0"),
        1 => format!("{ver}.0"),
        _ => ver.to_string(),
    }
}

impl TryFrom<String> for Capability {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Capability> for String {
    fn from(c: Capability) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}:{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Whether `available` covers every entry of `required` (semver-aware).
pub fn covers(available: &[Capability], required: &[Capability]) -> bool {
    required.iter().all(|req| available.iter().any(|have| have.satisfies(req)))
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
