//! Identifier types for events and agents.
//!
//! Events are keyed by a UUID v7 so that ids sort in creation order even when
//! a log is exported and merged elsewhere. Agents are keyed by their callsign
//! (`"hudson"`, `"alien"`, `"director"`), which is what commanders, prompts,
//! and event payloads refer to.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for an event in the event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }

    /// Whether this is the nil UUID, which the log refuses to accept.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EventId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Callsign of an agent (marine, alien, or director).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentId(pub String);

impl AgentId {
    /// Create an agent id from a callsign.
    pub fn new(callsign: impl Into<String>) -> Self {
        Self(callsign.into())
    }

    /// Borrow the callsign.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AgentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(callsign: &str) -> Self {
        Self(callsign.to_owned())
    }
}

impl From<String> for AgentId {
    fn from(callsign: String) -> Self {
        Self(callsign)
    }
}

impl PartialEq<str> for AgentId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
