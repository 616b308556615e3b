//! Session orchestration for the squad command simulation.
//!
//! Ties the event log, the reducer and the agent pipeline together into
//! rounds of play. The [`TurnSequencer`] is the only component that appends
//! to the log; everything else reads derived snapshots.
//!
//! # Modules
//!
//! - [`config`] -- Session configuration loaded from YAML
//! - [`decision`] -- The decision source trait and built-in sources
//! - [`context`] -- What each agent is shown before deciding
//! - [`resolution`] -- Target resolution and dice
//! - [`sequencer`] -- Phase ordering and the round loop
//! - [`snapshot`] -- Memoized world derivation
//! - [`radio`] -- The human-readable message side channel
//! - [`error`] -- Round rejection errors

pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod radio;
pub mod resolution;
pub mod sequencer;
pub mod snapshot;

pub use config::{ConfigError, SessionConfig, SessionMode};
pub use decision::{
    DecisionError, DecisionSource, MockDecisionSource, ScriptedDecisionSource, StubDecisionSource,
};
pub use error::SequenceError;
pub use radio::{MessageKind, RadioLog, RadioMessage};
pub use sequencer::{AgentTurn, PhaseTracker, RoundSummary, TurnSequencer};
pub use snapshot::SnapshotCache;
