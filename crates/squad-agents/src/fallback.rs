//! Safe default actions for agents whose proposals cannot be used.
//!
//! [`get_fallback_action`] is the one decision table for safe defaults. It
//! is deterministic and only ever picks an action the agent's class
//! permits.
//!
//! [`FallbackPolicy`] wraps the table. In [`FallbackMode::Mock`] it instead
//! draws a weighted random action from the agent's full permitted set (the
//! alien leans toward stealth, the director toward slow-burn narrative).
//! Mock mode has to be requested explicitly by whoever builds the policy;
//! production play never substitutes random intent.

use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use squad_types::{AgentKind, EventType, Personality, RawAction};

/// Stress above which a marine stops trusting its temperament.
pub const HIGH_STRESS: f64 = 7.0;

/// A safe default action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackAction {
    /// The chosen action.
    pub action: EventType,
    /// Target, when the table picks one (it currently never does; the
    /// sequencer resolves targets from the world).
    pub target: Option<String>,
    /// In-character explanation shown in the round narration.
    pub reasoning: String,
}

impl FallbackAction {
    fn new(action: EventType, reasoning: &str) -> Self {
        Self {
            action,
            target: None,
            reasoning: reasoning.to_owned(),
        }
    }

    /// The proposal a decision source would have sent for this action.
    pub fn to_raw(&self) -> RawAction {
        RawAction::object(self.action.as_str(), self.target.as_deref(), &self.reasoning)
    }
}

/// The deterministic fallback table.
///
/// Evaluated in priority order: a marine above [`HIGH_STRESS`] searches
/// regardless of temperament, a cautious marine searches, any other marine
/// moves, the alien sneaks, and the director nudges.
pub fn get_fallback_action(
    kind: AgentKind,
    personality: Option<Personality>,
    stress: f64,
) -> FallbackAction {
    match kind {
        AgentKind::Marine if stress > HIGH_STRESS => FallbackAction::new(
            EventType::Search,
            "Too wired to think straight. Falling back to a slow, careful search.",
        ),
        AgentKind::Marine if personality == Some(Personality::Cautious) => FallbackAction::new(
            EventType::Search,
            "Holding position and checking the area before doing anything rash.",
        ),
        AgentKind::Marine => {
            FallbackAction::new(EventType::Move, "No clear call. Pushing forward.")
        }
        AgentKind::Alien => FallbackAction::new(EventType::Sneak, "Staying in the shadows."),
        AgentKind::Director => {
            FallbackAction::new(EventType::Nudge, "Letting the tension build quietly.")
        }
    }
}

/// The fallback for an agent identified only by a class label.
///
/// An unrecognized label falls through to `report`.
pub fn fallback_for_label(
    label: &str,
    personality: Option<Personality>,
    stress: f64,
) -> FallbackAction {
    label.parse::<AgentKind>().map_or_else(
        |_| FallbackAction::new(EventType::Report, "Unrecognized unit. Reporting in."),
        |kind| get_fallback_action(kind, personality, stress),
    )
}

/// How the policy picks fallbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Always use the deterministic table.
    #[default]
    Deterministic,
    /// Weighted random draw over the permitted set, seeded.
    Mock,
}

/// Fallback selection with an explicit production/mock switch.
#[derive(Debug)]
pub struct FallbackPolicy {
    mode: FallbackMode,
    rng: Mutex<SmallRng>,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl FallbackPolicy {
    /// Create a policy in the given mode. `seed` only matters in mock mode.
    pub fn new(mode: FallbackMode, seed: u64) -> Self {
        Self {
            mode,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// The production policy.
    pub fn deterministic() -> Self {
        Self::new(FallbackMode::Deterministic, 0)
    }

    /// The mode this policy was built with.
    pub const fn mode(&self) -> FallbackMode {
        self.mode
    }

    /// Pick a fallback for an agent.
    pub fn select(
        &self,
        kind: AgentKind,
        personality: Option<Personality>,
        stress: f64,
    ) -> FallbackAction {
        match self.mode {
            FallbackMode::Deterministic => get_fallback_action(kind, personality, stress),
            FallbackMode::Mock => self
                .weighted(kind, personality)
                .unwrap_or_else(|| get_fallback_action(kind, personality, stress)),
        }
    }

    fn weighted(&self, kind: AgentKind, personality: Option<Personality>) -> Option<FallbackAction> {
        let weights = mock_weights(kind, personality);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let (action, _) = weights.choose_weighted(&mut *rng, |(_, w)| *w).ok()?;
        Some(FallbackAction::new(
            *action,
            "Improvising while the channel is unclear.",
        ))
    }
}

/// Mock-mode weights over each class's full permitted set.
fn mock_weights(kind: AgentKind, personality: Option<Personality>) -> Vec<(EventType, u32)> {
    match kind {
        AgentKind::Alien => vec![
            (EventType::Sneak, 4),
            (EventType::Hide, 3),
            (EventType::Lurk, 3),
            (EventType::Stalk, 2),
            (EventType::Ambush, 1),
            (EventType::Hunt, 1),
            (EventType::Attack, 1),
        ],
        AgentKind::Director => vec![
            (EventType::Nudge, 3),
            (EventType::Hazard, 2),
            (EventType::Reveal, 2),
            (EventType::Escalate, 1),
            (EventType::Isolate, 1),
            (EventType::Panic, 1),
        ],
        AgentKind::Marine => {
            let preferred = personality.map_or(&[][..], Personality::preferred_actions);
            kind.permitted_actions()
                .iter()
                .map(|a| (*a, if preferred.contains(a) { 3 } else { 1 }))
                .collect()
        }
    }
}
