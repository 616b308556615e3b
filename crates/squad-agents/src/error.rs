//! Why a proposed action was replaced by a fallback.
//!
//! These are expected, routine outcomes rather than failures: a
//! [`FallbackReason`] travels inside a
//! [`ValidatedAction`](crate::ValidatedAction) and is never raised to the
//! caller.

use squad_types::AgentKind;

/// The reason the fallback policy chose an agent's action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackReason {
    /// The proposal was text and no JSON could be recovered from it.
    #[error("proposal could not be parsed")]
    Unparseable,

    /// The proposal parsed but is not a key-value object.
    #[error("proposal is not an object")]
    NotAnObject,

    /// The proposal has no usable `action` field.
    #[error("proposal has no action")]
    MissingAction,

    /// The action is not in any agent's vocabulary.
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    /// The action exists but belongs to another agent class.
    #[error("`{action}` is not a {kind} action")]
    WrongAgentClass {
        /// The proposed action name.
        action: String,
        /// The agent's class.
        kind: AgentKind,
    },

    /// The `reasoning` field is missing or not a string.
    #[error("reasoning must be a string")]
    InvalidReasoning,

    /// The decision source did not answer in time.
    #[error("decision timed out")]
    DecisionTimeout,

    /// The decision source failed outright.
    #[error("decision source failed: {0}")]
    DecisionFailed(String),

    /// A marine ignored the commander's order.
    #[error("marine disobeyed the order")]
    Disobeyed,
}

impl FallbackReason {
    /// Short machine-readable label recorded in event results.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unparseable => "unparseable",
            Self::NotAnObject => "not_an_object",
            Self::MissingAction => "missing_action",
            Self::UnknownAction(_) => "unknown_action",
            Self::WrongAgentClass { .. } => "wrong_agent_class",
            Self::InvalidReasoning => "invalid_reasoning",
            Self::DecisionTimeout => "decision_timeout",
            Self::DecisionFailed(_) => "decision_failed",
            Self::Disobeyed => "disobeyed",
        }
    }

    /// Whether the proposal itself was at fault, as opposed to the decision
    /// source or the marine's temperament.
    pub const fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::Unparseable
                | Self::NotAnObject
                | Self::MissingAction
                | Self::UnknownAction(_)
                | Self::WrongAgentClass { .. }
                | Self::InvalidReasoning
        )
    }
}
