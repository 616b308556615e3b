//! Order compliance scoring for marines.
//!
//! Scores how well a marine's chosen action matches the commander's last
//! order. The score is advisory: it feeds the sequencer's disobedience roll
//! and the narration, and never changes the world by itself.
//!
//! Starting from the marine's compliance trait:
//! - the order naming the action's verb adds `+0.35`, naming the target
//!   adds `+0.15`, and an order matching neither subtracts `0.1`
//! - an action the marine's temperament prefers adds `+0.1`
//! - a risky action (attack, move) above the high-stress threshold
//!   subtracts `0.4`
//! - an action aimed at a mission-critical target never scores below `0.6`

use serde::{Deserialize, Serialize};
use squad_types::{EventType, Marine};

/// Targets whose handling matters for the mission.
pub const MISSION_CRITICAL_TARGETS: [&str; 3] = ["sample", "console", "door"];

/// Thresholds for compliance scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplianceRules {
    /// Confidence at or above which an action counts as compliant.
    #[serde(default = "default_approval_threshold")]
    pub approval_threshold: f64,
    /// Stress above which risky actions are penalized.
    #[serde(default = "default_high_stress")]
    pub high_stress: f64,
}

const fn default_approval_threshold() -> f64 {
    0.5
}

const fn default_high_stress() -> f64 {
    7.0
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            approval_threshold: default_approval_threshold(),
            high_stress: default_high_stress(),
        }
    }
}

/// The outcome of a compliance check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    /// Whether the action counts as following orders.
    pub approved: bool,
    /// Score in `[0, 1]`.
    pub confidence: f64,
    /// Human-readable breakdown.
    pub reason: String,
}

const VERB_BONUS: f64 = 0.35;
const TARGET_BONUS: f64 = 0.15;
const DEVIATION_PENALTY: f64 = 0.1;
const PERSONALITY_BONUS: f64 = 0.1;
const STRESS_PENALTY: f64 = 0.4;
const MISSION_FLOOR: f64 = 0.6;

/// Order words that count as asking for each action.
fn verbs(action: EventType) -> &'static [&'static str] {
    match action {
        EventType::Move => &["move", "go", "advance", "head", "proceed", "push", "retreat", "fall"],
        EventType::Search => &["search", "check", "look", "examine", "scan", "sweep", "find"],
        EventType::Interact => &[
            "grab", "take", "pick", "get", "open", "unlock", "use", "hack", "access", "retrieve",
            "bring", "carry", "drop", "deliver",
        ],
        EventType::Attack => &["attack", "shoot", "fire", "kill", "engage", "hit"],
        EventType::Cover => &["cover", "hold", "defend", "guard", "hunker", "wait", "stay"],
        EventType::Report => &["report", "radio", "status", "update", "tell", "talk"],
        _ => &[],
    }
}

/// Score a marine's action against the commander's order.
pub fn check_compliance(
    action: EventType,
    target: Option<&str>,
    marine: &Marine,
    order: Option<&str>,
    rules: &ComplianceRules,
) -> ComplianceCheck {
    let mut confidence = marine.compliance;
    let mut notes = Vec::new();

    if let Some(order) = order.map(str::trim).filter(|o| !o.is_empty()) {
        let order = order.to_lowercase();
        let words: Vec<&str> = order
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let verb_match = verbs(action).iter().any(|v| words.contains(v));
        let target_match =
            target.is_some_and(|t| !t.is_empty() && order.contains(&t.to_lowercase()));

        if verb_match {
            confidence += VERB_BONUS;
            notes.push("matches the ordered action");
        }
        if target_match {
            confidence += TARGET_BONUS;
            notes.push("matches the ordered target");
        }
        if !verb_match && !target_match {
            confidence -= DEVIATION_PENALTY;
            notes.push("deviates from the order");
        }
    } else {
        notes.push("no standing order");
    }

    if marine.personality.preferred_actions().contains(&action) {
        confidence += PERSONALITY_BONUS;
        notes.push("fits temperament");
    }

    if marine.stress > rules.high_stress && matches!(action, EventType::Attack | EventType::Move) {
        confidence -= STRESS_PENALTY;
        notes.push("stress-induced poor judgement");
    }

    if target.is_some_and(|t| MISSION_CRITICAL_TARGETS.contains(&t)) && confidence < MISSION_FLOOR {
        confidence = MISSION_FLOOR;
        notes.push("mission-critical target");
    }

    let confidence = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ComplianceCheck {
        approved: confidence >= rules.approval_threshold,
        confidence,
        reason: notes.join("; "),
    }
}
