//! Core entity structs: the event record and the derived world snapshot.
//!
//! The snapshot types are plain values. They are rebuilt from the static
//! scenario on every derivation and never persisted; only [`Event`] records
//! are.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{AgentKind, EventType, ItemStatus, Personality};
use crate::ids::{AgentId, EventId};

/// Upper bound of a marine's health.
pub const MAX_HEALTH: u8 = 10;

/// Upper bound of a marine's stress.
pub const MAX_STRESS: f64 = 10.0;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An immutable record of one state-changing occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Logical time; strictly increasing across the log.
    pub tick: u64,
    /// The category of event.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The agent that caused the event.
    pub actor: AgentId,
    /// Agent, zone, or item the event is aimed at.
    #[serde(default)]
    pub target: Option<String>,
    /// Type-specific payload.
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
    /// Resolution metadata (fallback use, compliance, dice).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

impl Event {
    /// Create an event with a fresh id and an empty payload.
    pub fn new(tick: u64, event_type: EventType, actor: impl Into<AgentId>) -> Self {
        Self {
            id: EventId::new(),
            tick,
            event_type,
            actor: actor.into(),
            target: None,
            details: BTreeMap::new(),
            result: None,
        }
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add one key to the details payload.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_owned(), value.into());
        self
    }

    /// Set the result payload.
    #[must_use]
    pub fn with_result(mut self, result: serde_json::Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Read a string detail.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(serde_json::Value::as_str)
    }

    /// Read a boolean detail.
    pub fn detail_bool(&self, key: &str) -> Option<bool> {
        self.details.get(key).and_then(serde_json::Value::as_bool)
    }

    /// Read a numeric detail as `f64`.
    pub fn detail_f64(&self, key: &str) -> Option<f64> {
        self.details.get(key).and_then(serde_json::Value::as_f64)
    }

    /// Read a non-negative integer detail.
    pub fn detail_u64(&self, key: &str) -> Option<u64> {
        self.details.get(key).and_then(serde_json::Value::as_u64)
    }
}

// ---------------------------------------------------------------------------
// Zones and items
// ---------------------------------------------------------------------------

/// State of one item or sub-item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ItemState {
    /// Current state.
    pub state: ItemStatus,
    /// Remaining contents of a container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Vec<String>>,
    /// Carrier, when the item is in someone's inventory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_by: Option<AgentId>,
    /// Marked with the creature's blood.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yellow_blood: Option<bool>,
}

impl ItemState {
    /// A bare item in the given state.
    pub const fn new(state: ItemStatus) -> Self {
        Self {
            state,
            contents: None,
            carried_by: None,
            yellow_blood: None,
        }
    }

    /// A container holding `contents`.
    pub fn container(contents: &[&str]) -> Self {
        Self {
            state: ItemStatus::Full,
            contents: Some(contents.iter().map(|c| (*c).to_owned()).collect()),
            carried_by: None,
            yellow_blood: None,
        }
    }
}

/// A location on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Zone {
    /// Adjacent zones (static).
    pub connections: Vec<String>,
    /// Loose items keyed by name.
    pub items: BTreeMap<String, ItemState>,
    /// Door sub-item, if the zone has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub door: Option<ItemState>,
    /// Console sub-item, if the zone has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console: Option<ItemState>,
}

impl Zone {
    /// Whether `other` is directly reachable from this zone.
    pub fn connects_to(&self, other: &str) -> bool {
        self.connections.iter().any(|c| c == other)
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// A squad member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Marine {
    /// Callsign.
    pub id: AgentId,
    /// Temperament.
    pub personality: Personality,
    /// Probability of following orders, in `[0, 1]`.
    pub compliance: f64,
    /// Current zone.
    pub position: String,
    /// Health in `[0, 10]`.
    pub health: u8,
    /// Stress in `[0, 10]`.
    pub stress: f64,
    /// Carried item names.
    pub inventory: Vec<String>,
}

impl Marine {
    /// Add `delta` to stress, clamped to `[0, MAX_STRESS]`.
    pub fn adjust_stress(&mut self, delta: f64) {
        let next = self.stress + delta;
        self.stress = if next.is_finite() {
            next.clamp(0.0, MAX_STRESS)
        } else {
            self.stress
        };
    }

    /// Subtract `damage` from health, flooring at zero.
    pub fn apply_damage(&mut self, damage: u64) {
        let damage = u8::try_from(damage).unwrap_or(u8::MAX);
        self.health = self.health.saturating_sub(damage).min(MAX_HEALTH);
    }

    /// Whether the marine is still standing.
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// The hostile creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Alien {
    /// Callsign.
    pub id: AgentId,
    /// Current zone.
    pub position: String,
    /// Whether the squad knows where it is.
    pub hidden: bool,
    /// Carried item names.
    pub inventory: Vec<String>,
}

/// The tension-shaping meta-agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Director {
    /// Callsign.
    pub id: AgentId,
    /// Human-readable record of interventions so far.
    pub adjustments: Vec<String>,
    /// Carried item names.
    pub inventory: Vec<String>,
}

/// All agents in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Agents {
    /// Marines in acting order.
    pub marines: Vec<Marine>,
    /// The alien.
    pub alien: Alien,
    /// The director.
    pub director: Director,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The derived, disposable materialization of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Zones keyed by name.
    pub zones: BTreeMap<String, Zone>,
    /// Everyone on the map.
    pub agents: Agents,
}

impl WorldSnapshot {
    /// Find a marine by callsign.
    pub fn marine(&self, id: &AgentId) -> Option<&Marine> {
        self.agents.marines.iter().find(|m| m.id == *id)
    }

    /// Find a marine by callsign, mutably.
    pub fn marine_mut(&mut self, id: &AgentId) -> Option<&mut Marine> {
        self.agents.marines.iter_mut().find(|m| m.id == *id)
    }

    /// Classify an agent id.
    pub fn kind_of(&self, id: &AgentId) -> Option<AgentKind> {
        if self.marine(id).is_some() {
            Some(AgentKind::Marine)
        } else if self.agents.alien.id == *id {
            Some(AgentKind::Alien)
        } else if self.agents.director.id == *id {
            Some(AgentKind::Director)
        } else {
            None
        }
    }

    /// Current zone of a marine or the alien.
    pub fn position_of(&self, id: &AgentId) -> Option<&str> {
        if let Some(marine) = self.marine(id) {
            return Some(marine.position.as_str());
        }
        (self.agents.alien.id == *id).then_some(self.agents.alien.position.as_str())
    }

    /// Agent ids in round order: marines, then the alien, then the director.
    pub fn turn_order(&self) -> Vec<AgentId> {
        let mut order: Vec<AgentId> = self.agents.marines.iter().map(|m| m.id.clone()).collect();
        order.push(self.agents.alien.id.clone());
        order.push(self.agents.director.id.clone());
        order
    }
}
