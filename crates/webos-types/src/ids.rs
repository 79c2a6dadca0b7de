//! Typed identifiers.
//!
//! `BackendId` wraps a UUIDv7 (time-ordered, globally unique). It names one
//! filesystem backend instance so mounts can be told apart in logs and mount
//! listings even when two backends share a kind. The `short()` form (first 8
//! hex chars) is for human-facing output only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of one filesystem backend instance (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendId(uuid::Uuid);

impl BackendId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for log output.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }

    /// Full 32-character hex string (no hyphens).
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}

impl Default for BackendId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for BackendId {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full UUID with hyphens for log readability
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendId({})", self.short())
    }
}
