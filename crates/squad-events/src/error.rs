//! Error types for the event log.

use squad_types::{AgentKind, EventId, EventType};

/// A structural defect that makes an event unfit for the log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    /// The event id is the nil UUID.
    #[error("event id is nil")]
    NilId,

    /// The event id is already present in the log.
    #[error("duplicate event id {0}")]
    DuplicateId(EventId),

    /// The actor identifier is blank.
    #[error("actor is empty")]
    EmptyActor,

    /// The event type is not one this build recognizes.
    #[error("unrecognized event type")]
    UnknownType,

    /// A target was given but is blank.
    #[error("target is present but empty")]
    EmptyTarget,

    /// A details key is blank.
    #[error("details contain an empty key")]
    EmptyDetailKey,

    /// The result payload is not a key-value object.
    #[error("result must be an object")]
    ResultNotObject,

    /// The event type needs a target and none was given.
    #[error("{0} event has no target")]
    MissingTarget(EventType),

    /// The actor's class may not take this action.
    #[error("a {kind} may not {action}")]
    ForbiddenAction {
        /// Class of the acting agent.
        kind: AgentKind,
        /// The action it attempted.
        action: EventType,
    },
}

/// Errors returned by [`EventLog`](crate::EventLog) operations.
///
/// Both append failures indicate a defect upstream of the log, not agent
/// misbehavior; callers abort the round instead of retrying.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    /// The event does not match the fixed event schema.
    #[error("schema violation at tick {tick}: {violation}")]
    Schema {
        /// Tick of the offending event.
        tick: u64,
        /// What was wrong with it.
        violation: SchemaViolation,
    },

    /// The event's tick does not follow the last recorded tick.
    #[error("tick {attempted} does not follow last tick {last}")]
    Ordering {
        /// Tick of the last event in the log.
        last: u64,
        /// Tick of the rejected event.
        attempted: u64,
    },

    /// An exported log could not be decoded.
    #[error("event log decode error: {0}")]
    Decode(#[from] serde_json::Error),
}
