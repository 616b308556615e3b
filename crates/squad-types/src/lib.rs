//! Shared type definitions for the squad command simulation.
//!
//! Every crate in the workspace speaks in these types. The ones the UI
//! consumes derive `ts-rs` so `TypeScript` bindings can be generated.
//!
//! # Modules
//!
//! - [`ids`] -- Event and agent identifiers
//! - [`enums`] -- Event/action vocabulary, agent kinds, item states
//! - [`structs`] -- The event record and the derived world snapshot
//! - [`actions`] -- Decision requests and raw action proposals

pub mod actions;
pub mod enums;
pub mod ids;
pub mod structs;

pub use actions::{DecisionRequest, ProposedAction, RawAction, VisibleEntity};
pub use enums::{AgentKind, EventType, ItemStatus, Personality};
pub use ids::{AgentId, EventId};
pub use structs::{
    Agents, Alien, Director, Event, ItemState, MAX_HEALTH, MAX_STRESS, Marine, WorldSnapshot, Zone,
};
