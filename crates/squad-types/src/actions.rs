//! Decision I/O: what an agent is shown and what it may send back.
//!
//! A decision source (a human at the console or a language model) receives a
//! [`DecisionRequest`] and answers with a [`RawAction`]. The raw answer is
//! untrusted and has no guaranteed shape; the action validator turns it into
//! a well-typed action or a fallback.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentKind, Personality};
use crate::ids::AgentId;
use crate::structs::Event;

// ---------------------------------------------------------------------------
// Proposals
// ---------------------------------------------------------------------------

/// An unvalidated action proposal as it arrives from a decision source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAction {
    /// Free text, usually a model completion that should contain JSON.
    Text(String),
    /// An already-parsed JSON value of unknown shape.
    Json(serde_json::Value),
}

impl RawAction {
    /// Build an object proposal from its parts.
    pub fn object(action: &str, target: Option<&str>, reasoning: &str) -> Self {
        let mut map = serde_json::Map::new();
        map.insert("action".to_owned(), action.into());
        if let Some(target) = target {
            map.insert("target".to_owned(), target.into());
        }
        map.insert("reasoning".to_owned(), reasoning.into());
        Self::Json(serde_json::Value::Object(map))
    }
}

impl From<&str> for RawAction {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<serde_json::Value> for RawAction {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<ProposedAction> for RawAction {
    fn from(action: ProposedAction) -> Self {
        Self::object(&action.action, action.target.as_deref(), &action.reasoning)
    }
}

/// The well-formed shape a decision source is asked to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProposedAction {
    /// Action verb.
    pub action: String,
    /// Agent, zone, or item the action is aimed at.
    #[serde(default)]
    pub target: Option<String>,
    /// In-character explanation.
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Something the acting agent can perceive from its zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VisibleEntity {
    /// Agent callsign, item name, or zone name.
    pub name: String,
    /// `"marine"`, `"alien"`, `"item"`, `"door"`, `"console"`, or `"exit"`.
    pub kind: String,
    /// Zone the entity is in.
    pub zone: String,
    /// Short state description (item state, marine health).
    pub status: String,
}

/// Everything a decision source is given for one agent's turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DecisionRequest {
    /// The acting agent.
    pub agent_id: AgentId,
    /// The acting agent's class.
    pub agent_kind: AgentKind,
    /// Temperament, for marines.
    pub personality: Option<Personality>,
    /// Current stress (zero for non-marines).
    pub stress: f64,
    /// Current zone, if the agent occupies one.
    pub position: Option<String>,
    /// What the agent can perceive.
    pub visible_entities: Vec<VisibleEntity>,
    /// Bounded tail of the event log.
    pub recent_events: Vec<Event>,
    /// The commander's order for this round.
    pub commander_order: Option<String>,
    /// Action names the agent may choose from.
    pub permitted_actions: Vec<String>,
}
