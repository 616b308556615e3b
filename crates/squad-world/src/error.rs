//! Error types for the `squad-world` crate.
//!
//! A [`ReduceError`] explains why one event's effect was skipped during a
//! fold. It never escapes [`derive_state`](crate::derive_state).

use squad_types::{AgentId, EventType, ItemStatus};

/// Why an event could not be applied to the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReduceError {
    /// A detail the event type requires is missing or has the wrong type.
    #[error("missing or malformed detail `{0}`")]
    MissingDetail(&'static str),

    /// The event needs a target and has none.
    #[error("event has no target")]
    MissingTarget,

    /// The actor or target agent does not exist.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    /// The zone is not on the map.
    #[error("unknown zone: {0}")]
    UnknownZone(String),

    /// The zone has no item of that name.
    #[error("no item `{item}` in zone {zone}")]
    UnknownItem {
        /// Zone searched.
        zone: String,
        /// Item requested.
        item: String,
    },

    /// The actor is somewhere other than the zone the event names.
    #[error("agent {actor} is not in zone {zone}")]
    ActorNotInZone {
        /// The acting agent.
        actor: AgentId,
        /// The zone the event named.
        zone: String,
    },

    /// A forced relocation had no valid destination.
    #[error("zone {from} has no exit to {to}")]
    NotAdjacent {
        /// Current zone.
        from: String,
        /// Requested zone.
        to: String,
    },

    /// A drop named an item the actor does not hold.
    #[error("agent {actor} is not carrying {item}")]
    NotCarrying {
        /// The acting agent.
        actor: AgentId,
        /// The item named.
        item: String,
    },

    /// The item is in a state this interaction cannot change.
    #[error("item `{item}` is {state:?}")]
    InvalidItemState {
        /// Item name.
        item: String,
        /// Its current state.
        state: ItemStatus,
    },

    /// The actor's class may not cause this event type.
    #[error("{actor} may not cause {event_type} events")]
    WrongActorClass {
        /// The acting agent.
        actor: AgentId,
        /// The event type.
        event_type: EventType,
    },

    /// The event type is not recognized by this build.
    #[error("unrecognized event type")]
    UnknownEventType,
}
