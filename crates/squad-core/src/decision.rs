//! Decision source trait and its built-in implementations.
//!
//! Once per round the sequencer presents each acting agent with a
//! [`DecisionRequest`] and awaits a [`RawAction`] in response. The
//! [`DecisionSource`] trait abstracts where that answer comes from: a human
//! at the console, a language model behind a network call, a script, or a
//! test stub. Answers are untrusted; the sequencer validates every one.
//!
//! - [`StubDecisionSource`] always proposes the agent's safe default.
//! - [`ScriptedDecisionSource`] replays queued proposals per agent.
//! - [`MockDecisionSource`] invents proposals at random, including some
//!   malformed ones, and is only built in mock mode.

use std::collections::{BTreeMap, VecDeque};

use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use squad_agents::get_fallback_action;
use squad_types::{AgentId, DecisionRequest, RawAction};

/// Errors a decision source can report instead of an answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionError {
    /// The source gave up waiting for the agent.
    #[error("agent {agent_id} timed out (deadline: {deadline_ms}ms)")]
    Timeout {
        /// The agent that timed out.
        agent_id: AgentId,
        /// The deadline in milliseconds.
        deadline_ms: u64,
    },

    /// The source could not produce an answer at all.
    #[error("decision source unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// A source of agent decisions.
///
/// The sequencer wraps every call in its own deadline, so an
/// implementation that never returns only costs the agent its turn.
#[allow(async_fn_in_trait)]
pub trait DecisionSource {
    /// Propose an action for the agent described by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`DecisionError`] when no proposal can be produced. The
    /// sequencer substitutes the agent's fallback.
    async fn decide(&mut self, request: &DecisionRequest) -> Result<RawAction, DecisionError>;
}

/// A decision source that always proposes the agent's safe default.
#[derive(Debug, Clone, Default)]
pub struct StubDecisionSource;

impl StubDecisionSource {
    /// Create a new stub decision source.
    pub const fn new() -> Self {
        Self
    }
}

impl DecisionSource for StubDecisionSource {
    async fn decide(&mut self, request: &DecisionRequest) -> Result<RawAction, DecisionError> {
        let fallback =
            get_fallback_action(request.agent_kind, request.personality, request.stress);
        Ok(fallback.to_raw())
    }
}

/// Replays queued proposals, one per call, separately for each agent.
///
/// An agent whose queue is empty gets [`DecisionError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisionSource {
    queues: BTreeMap<AgentId, VecDeque<Result<RawAction, DecisionError>>>,
}

impl ScriptedDecisionSource {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a proposal for an agent.
    #[must_use]
    pub fn push(mut self, agent: impl Into<AgentId>, raw: impl Into<RawAction>) -> Self {
        self.queue(agent.into()).push_back(Ok(raw.into()));
        self
    }

    /// Queue a failure for an agent.
    #[must_use]
    pub fn fail(mut self, agent: impl Into<AgentId>, error: DecisionError) -> Self {
        self.queue(agent.into()).push_back(Err(error));
        self
    }

    /// Proposals still queued for an agent.
    pub fn remaining(&self, agent: &AgentId) -> usize {
        self.queues.get(agent).map_or(0, VecDeque::len)
    }

    fn queue(&mut self, agent: AgentId) -> &mut VecDeque<Result<RawAction, DecisionError>> {
        self.queues.entry(agent).or_default()
    }
}

impl DecisionSource for ScriptedDecisionSource {
    async fn decide(&mut self, request: &DecisionRequest) -> Result<RawAction, DecisionError> {
        self.queues
            .get_mut(&request.agent_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(DecisionError::Unavailable {
                    message: format!("no scripted decision for {}", request.agent_id),
                })
            })
    }
}

/// Chance that a mock proposal is deliberately broken.
const MOCK_GARBAGE_CHANCE: f64 = 0.15;

/// Random proposals for developer runs without a real decision source.
///
/// Picks a permitted action and a target from what the agent can see.
/// Now and then it sends malformed output instead, so the validator and
/// fallback paths get exercised.
#[derive(Debug)]
pub struct MockDecisionSource {
    rng: SmallRng,
}

impl MockDecisionSource {
    /// Create a mock source with its own seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn garbage(&mut self, request: &DecisionRequest) -> RawAction {
        match self.rng.random_range(0..4_u8) {
            0 => RawAction::Text("I think we should... uh".to_owned()),
            1 => RawAction::Json(json!({ "action": "teleport", "reasoning": "why not" })),
            2 => RawAction::Json(json!({ "action": null, "target": 3 })),
            _ => RawAction::Text(format!(
                "```json\n{{\"action\": \"message\", \"reasoning\": \"{} checking in\",}}\n```",
                request.agent_id
            )),
        }
    }
}

impl DecisionSource for MockDecisionSource {
    async fn decide(&mut self, request: &DecisionRequest) -> Result<RawAction, DecisionError> {
        if self.rng.random_bool(MOCK_GARBAGE_CHANCE) {
            return Ok(self.garbage(request));
        }
        let Some(action) = request.permitted_actions.choose(&mut self.rng).cloned() else {
            return Err(DecisionError::Unavailable {
                message: format!("{} has no permitted actions", request.agent_id),
            });
        };
        let target = request
            .visible_entities
            .choose(&mut self.rng)
            .map(|e| e.name.clone());
        Ok(RawAction::object(
            &action,
            target.as_deref(),
            "Making it up as I go.",
        ))
    }
}
