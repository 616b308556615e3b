//! Errors raised by the turn sequencer.
//!
//! A [`SequenceError`] always means the round was rejected as a whole: no
//! event from it reached the log.

use squad_events::EventLogError;
use squad_types::{AgentId, AgentKind};

/// A round that could not be recorded.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// The event log refused the batch (bad shape or non-monotonic tick).
    #[error("event log rejected the round: {source}")]
    Log {
        /// The underlying log error.
        #[from]
        source: EventLogError,
    },

    /// An agent acted after a later phase had already started.
    #[error("{actor} ({kind}) acted during the {phase} phase")]
    PhaseOutOfOrder {
        /// The offending agent.
        actor: AgentId,
        /// The agent's class.
        kind: AgentKind,
        /// The phase the round had already reached.
        phase: AgentKind,
    },

    /// The same agent appears twice in one round.
    #[error("{0} acted twice in one round")]
    DuplicateActor(AgentId),

    /// The actor is not part of the squad, the alien, or the director.
    #[error("unknown actor {0}")]
    UnknownActor(AgentId),
}
