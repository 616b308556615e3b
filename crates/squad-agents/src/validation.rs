//! The action validator.
//!
//! Turns an untrusted [`RawAction`] into a [`ValidatedAction`] that is always
//! a member of the agent's permitted action set. Decoding is an explicit
//! `Result<Decoded, FallbackReason>` pipeline:
//!
//! 1. Text is parsed (with the JSON recovery in [`crate::parse`])
//! 2. The value must be an object
//! 3. `action` is trimmed and lower-cased; `target` is dropped unless it is
//!    a non-blank string; `reasoning` must be a string
//! 4. The action must be permitted for the agent's class. A handful of
//!    near-miss names (`message`, `examine`, ...) are remapped to the
//!    class's equivalent instead of being rejected
//!
//! A rejection never escapes: the fallback policy supplies the action and
//! the reason is carried along for the narration.

use serde_json::Value;
use squad_types::{AgentKind, EventType, Personality, RawAction};
use tracing::{debug, warn};

use crate::error::FallbackReason;
use crate::fallback::FallbackPolicy;
use crate::parse::recover_json;

/// Default allowance of decode/remap attempts per action.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// The agent an action is being validated for.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentProfile {
    /// The agent's class.
    pub kind: AgentKind,
    /// Temperament, for marines.
    pub personality: Option<Personality>,
    /// Current stress.
    pub stress: f64,
    /// Display name used in diagnostics.
    pub label: Option<String>,
}

impl AgentProfile {
    /// A profile with no temperament and zero stress.
    pub const fn new(kind: AgentKind) -> Self {
        Self {
            kind,
            personality: None,
            stress: 0.0,
            label: None,
        }
    }

    /// A marine profile.
    pub const fn marine(personality: Personality, stress: f64) -> Self {
        Self {
            kind: AgentKind::Marine,
            personality: Some(personality),
            stress,
            label: None,
        }
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn name(&self) -> &str {
        self.label.as_deref().unwrap_or_else(|| self.kind.as_str())
    }
}

/// A successfully decoded proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The permitted action.
    pub action: EventType,
    /// Normalized target.
    pub target: Option<String>,
    /// The agent's explanation.
    pub reasoning: String,
    /// Whether a near-miss name was remapped to reach `action`.
    pub remapped: bool,
}

/// The validator's output. `action` is always permitted for the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAction {
    /// The action to record.
    pub action: EventType,
    /// Normalized target.
    pub target: Option<String>,
    /// Explanation: the agent's own or the fallback's.
    pub reasoning: String,
    /// False when the proposal was rejected.
    pub is_valid: bool,
    /// True when the fallback policy supplied the action.
    pub fallback_used: bool,
    /// True when a near-miss name was remapped.
    pub remapped: bool,
    /// Attempts consumed, capped at the retry allowance.
    pub retry_count: u32,
    /// Why the fallback was used.
    pub fallback_reason: Option<FallbackReason>,
}

/// Validator bound to a fallback policy and a retry allowance.
#[derive(Debug)]
pub struct ActionValidator {
    policy: FallbackPolicy,
    max_retries: u32,
}

impl Default for ActionValidator {
    fn default() -> Self {
        Self::new(FallbackPolicy::deterministic(), DEFAULT_MAX_RETRIES)
    }
}

impl ActionValidator {
    /// Create a validator.
    pub const fn new(policy: FallbackPolicy, max_retries: u32) -> Self {
        Self {
            policy,
            max_retries,
        }
    }

    /// The retry allowance.
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The fallback policy in use.
    pub const fn policy(&self) -> &FallbackPolicy {
        &self.policy
    }

    /// Validate a proposal. `attempt` is the number of attempts already
    /// spent on this action (zero for the first).
    pub fn validate(&self, raw: &RawAction, profile: &AgentProfile, attempt: u32) -> ValidatedAction {
        match decode(raw, profile.kind) {
            Ok(decoded) => {
                let retry_count = if decoded.remapped {
                    debug!(
                        agent = profile.name(),
                        action = %decoded.action,
                        "Remapped near-miss action"
                    );
                    self.cap(attempt.saturating_add(1))
                } else {
                    self.cap(attempt)
                };
                ValidatedAction {
                    action: decoded.action,
                    target: decoded.target,
                    reasoning: decoded.reasoning,
                    is_valid: true,
                    fallback_used: false,
                    remapped: decoded.remapped,
                    retry_count,
                    fallback_reason: None,
                }
            }
            Err(reason) => self.fallback(profile, reason, attempt),
        }
    }

    /// Replace an agent's action with the policy's fallback.
    pub fn fallback(
        &self,
        profile: &AgentProfile,
        reason: FallbackReason,
        attempt: u32,
    ) -> ValidatedAction {
        let choice = self
            .policy
            .select(profile.kind, profile.personality, profile.stress);
        warn!(
            agent = profile.name(),
            reason = %reason,
            fallback = %choice.action,
            "Using fallback action"
        );
        ValidatedAction {
            action: choice.action,
            target: choice.target,
            reasoning: choice.reasoning,
            is_valid: false,
            fallback_used: true,
            remapped: false,
            retry_count: self.cap(attempt.saturating_add(1)),
            fallback_reason: Some(reason),
        }
    }

    fn cap(&self, attempts: u32) -> u32 {
        attempts.min(self.max_retries)
    }
}

/// Validate with the deterministic fallback table.
pub fn validate_action(
    raw: &RawAction,
    profile: &AgentProfile,
    attempt: u32,
    max_retries: u32,
) -> ValidatedAction {
    ActionValidator::new(FallbackPolicy::deterministic(), max_retries).validate(raw, profile, attempt)
}

/// Decode a proposal for an agent class.
pub fn decode(raw: &RawAction, kind: AgentKind) -> Result<Decoded, FallbackReason> {
    let parsed;
    let value = match raw {
        RawAction::Text(text) => {
            parsed = recover_json(text).ok_or(FallbackReason::Unparseable)?;
            &parsed
        }
        RawAction::Json(value) => value,
    };
    let object = value.as_object().ok_or(FallbackReason::NotAnObject)?;

    let name = object
        .get("action")
        .and_then(Value::as_str)
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .ok_or(FallbackReason::MissingAction)?;
    let target = object
        .get("target")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned);
    let reasoning = object
        .get("reasoning")
        .and_then(Value::as_str)
        .ok_or(FallbackReason::InvalidReasoning)?
        .to_owned();

    let (action, remapped) = resolve_action(&name, kind)?;
    Ok(Decoded {
        action,
        target,
        reasoning,
        remapped,
    })
}

fn resolve_action(name: &str, kind: AgentKind) -> Result<(EventType, bool), FallbackReason> {
    match EventType::from_name(name) {
        Some(action) if kind.permits(action) => Ok((action, false)),
        Some(_) => Err(FallbackReason::WrongAgentClass {
            action: name.to_owned(),
            kind,
        }),
        None => alias(name, kind)
            .map(|action| (action, true))
            .ok_or_else(|| FallbackReason::UnknownAction(name.to_owned())),
    }
}

/// Near-miss names a class's proposals are remapped from.
///
/// No alias shadows a real action name, so an action that belongs to
/// another class is always rejected rather than remapped.
pub fn alias(name: &str, kind: AgentKind) -> Option<EventType> {
    let action = match (kind, name) {
        (AgentKind::Marine, "message" | "radio" | "say" | "speak") => EventType::Report,
        (AgentKind::Marine, "examine" | "inspect" | "look" | "scan") => EventType::Search,
        (AgentKind::Marine, "use" | "open" | "take" | "grab" | "pickup" | "unlock") => {
            EventType::Interact
        }
        (AgentKind::Marine, "shoot" | "fire") => EventType::Attack,
        (AgentKind::Marine, "go" | "walk" | "advance") => EventType::Move,
        (AgentKind::Marine, "defend" | "hold") => EventType::Cover,
        (AgentKind::Alien, "creep" | "slither") => EventType::Sneak,
        (AgentKind::Alien, "strike" | "bite") => EventType::Attack,
        (AgentKind::Alien, "wait") => EventType::Lurk,
        (AgentKind::Alien, "follow") => EventType::Stalk,
        (AgentKind::Alien, "conceal") => EventType::Hide,
        (AgentKind::Director, "message" | "whisper") => EventType::Nudge,
        (AgentKind::Director, "intensify") => EventType::Escalate,
        _ => return None,
    };
    Some(action)
}
