//! The turn sequencer: one round of play, end to end.
//!
//! A round walks the phases `marine -> alien -> director`. Each living
//! agent is asked for a decision under a deadline, the answer is validated
//! (with fallback), marines are checked against the commander's order, and
//! the action is resolved into an event. Every event of the round is
//! applied to a working copy of the world as it is produced, so later
//! agents see the effects of earlier ones, but the log itself only takes
//! the round as one atomic batch at the very end.
//!
//! The sequencer owns the [`EventLog`]. Nothing else appends.
//!
//! # Round Outcomes
//!
//! Every agent turn ends in exactly one event. Timeouts, failures, garbage
//! proposals and disobedience all resolve to the agent's fallback within
//! the same round. Only a [`SequenceError`] (a programming error upstream)
//! rejects a round, and then nothing from it is recorded.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};
use squad_agents::{
    ActionValidator, AgentProfile, ComplianceCheck, ComplianceRules, FallbackPolicy,
    FallbackReason, ValidatedAction, check_compliance, decode,
};
use squad_events::{EventLog, EventLogError, schema};
use squad_types::{AgentId, AgentKind, Event, EventType, Marine, RawAction, WorldSnapshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::context;
use crate::decision::{DecisionError, DecisionSource};
use crate::error::SequenceError;
use crate::radio::{MessageKind, RadioLog, RadioMessage};
use crate::resolution;
use crate::snapshot::SnapshotCache;

/// Author name used for commander orders on the radio.
pub const COMMANDER: &str = "commander";

/// Enforces phase order and single action per agent within one round.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    phase: Option<AgentKind>,
    acted: HashSet<AgentId>,
}

impl PhaseTracker {
    /// A tracker at the start of a round.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `actor` into the round.
    ///
    /// Fails if a later phase has already started or the actor has already
    /// acted. On failure the tracker is unchanged.
    pub fn admit(&mut self, actor: &AgentId, kind: AgentKind) -> Result<(), SequenceError> {
        if let Some(phase) = self.phase
            && kind < phase
        {
            return Err(SequenceError::PhaseOutOfOrder {
                actor: actor.clone(),
                kind,
                phase,
            });
        }
        if self.acted.contains(actor) {
            return Err(SequenceError::DuplicateActor(actor.clone()));
        }
        self.acted.insert(actor.clone());
        self.phase = Some(kind);
        Ok(())
    }

    /// The phase reached so far, `None` before anyone acted.
    pub const fn phase(&self) -> Option<AgentKind> {
        self.phase
    }
}

/// What happened on one agent's turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTurn {
    /// Who acted.
    pub agent: AgentId,
    /// The agent's class.
    pub kind: AgentKind,
    /// The recorded event.
    pub event: Event,
    /// The validator's verdict, after any disobedience substitution.
    pub action: ValidatedAction,
    /// Compliance score, for marines acting under an order.
    pub compliance: Option<ComplianceCheck>,
    /// Whether the event changed the world.
    pub applied: bool,
}

impl AgentTurn {
    /// One line of narration for the round summary.
    pub fn narration(&self) -> String {
        let target = self
            .event
            .target
            .as_deref()
            .map(|t| format!(" -> {t}"))
            .unwrap_or_default();
        let outcome = self.outcome();
        let mut line = format!(
            "{} {}{target}{outcome}: {}",
            self.agent, self.event.event_type, self.action.reasoning
        );
        if let Some(reason) = &self.action.fallback_reason {
            line.push_str(&format!(" [fallback: {reason}]"));
        } else if self.action.remapped {
            line.push_str(" [remapped]");
        }
        line
    }

    fn outcome(&self) -> String {
        match (
            self.event.detail_bool("hit"),
            self.event.detail_u64("damage"),
        ) {
            (Some(true), Some(damage)) => format!(" (hit, {damage} damage)"),
            (Some(true), None) => " (hit)".to_owned(),
            (Some(false), _) => " (miss)".to_owned(),
            _ if !self.applied => " (no effect)".to_owned(),
            _ => String::new(),
        }
    }
}

/// Everything one round produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    /// Round number, starting at 1.
    pub round: u64,
    /// Agent turns in the order they were taken.
    pub turns: Vec<AgentTurn>,
}

impl RoundSummary {
    /// The recorded events in log order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.turns.iter().map(|t| &t.event)
    }

    /// The narration lines, one per turn.
    pub fn narration(&self) -> Vec<String> {
        self.turns.iter().map(AgentTurn::narration).collect()
    }

    /// How many turns ended in a fallback.
    pub fn fallbacks(&self) -> usize {
        self.turns.iter().filter(|t| t.action.fallback_used).count()
    }
}

/// Orchestrates rounds and owns the event log.
#[derive(Debug)]
pub struct TurnSequencer {
    log: EventLog,
    cache: SnapshotCache,
    radio: RadioLog,
    validator: ActionValidator,
    rules: ComplianceRules,
    rng: SmallRng,
    decision_timeout: Duration,
    recent_event_window: usize,
    round: u64,
}

impl TurnSequencer {
    /// A sequencer with an empty log.
    pub fn new(config: &SessionConfig) -> Self {
        Self::with_log(EventLog::new(), config)
    }

    /// A sequencer continuing an existing log.
    ///
    /// The round counter resumes from the highest round recorded in the
    /// log's events. The dice are seeded from the configured seed and the
    /// log's next tick, so a resumed session does not replay the rolls of
    /// the session that wrote the log.
    pub fn with_log(log: EventLog, config: &SessionConfig) -> Self {
        let settings = &config.session;
        let seed = settings.seed.wrapping_add(log.next_tick());
        let policy = FallbackPolicy::new(settings.mode.fallback_mode(), seed.wrapping_add(1));
        let round = log
            .all()
            .iter()
            .filter_map(|e| e.detail_u64("round"))
            .max()
            .unwrap_or(0);
        Self {
            log,
            cache: SnapshotCache::new(),
            radio: RadioLog::new(),
            validator: ActionValidator::new(policy, settings.max_retries),
            rules: config.compliance,
            rng: SmallRng::seed_from_u64(seed),
            decision_timeout: settings.decision_timeout(),
            recent_event_window: settings.recent_event_window,
            round,
        }
    }

    /// The event log, read-only.
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// Give up the sequencer and keep its log.
    pub fn into_log(self) -> EventLog {
        self.log
    }

    /// The radio log.
    pub const fn radio(&self) -> &RadioLog {
        &self.radio
    }

    /// Rounds completed so far.
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// The current world, derived from the log.
    pub fn snapshot(&mut self) -> &WorldSnapshot {
        self.cache.get(&self.log)
    }

    /// Record a round's events.
    ///
    /// The batch is checked as a whole before anything is appended: every
    /// actor must be a known agent taking an action its class permits, and
    /// appear at most once, and the phases must run marines, then the alien,
    /// then the director. Ticks and shape are then enforced by the log.
    /// Either every event is recorded or none is.
    pub fn submit_round(&mut self, events: Vec<Event>) -> Result<(), SequenceError> {
        let roster = squad_world::scenario();
        let mut tracker = PhaseTracker::new();
        for event in &events {
            let kind = roster
                .kind_of(&event.actor)
                .ok_or_else(|| SequenceError::UnknownActor(event.actor.clone()))?;
            schema::check_actor(event, kind).map_err(|violation| EventLogError::Schema {
                tick: event.tick,
                violation,
            })?;
            tracker.admit(&event.actor, kind)?;
        }
        let count = events.len();
        self.log.append_batch(events)?;
        info!(
            events = count,
            log_len = self.log.len(),
            "Round recorded"
        );
        Ok(())
    }

    /// Play one full round.
    ///
    /// `order` is the commander's free-text order for this round, passed
    /// verbatim to marine decisions and the compliance check.
    pub async fn run_round<S: DecisionSource>(
        &mut self,
        source: &mut S,
        order: Option<&str>,
    ) -> Result<RoundSummary, SequenceError> {
        let order = order.map(str::trim).filter(|o| !o.is_empty());
        let round = self.round.saturating_add(1);
        let mut world = self.snapshot().clone();
        let mut tick = self.log.next_tick();
        let mut pending: Vec<Event> = Vec::new();
        let mut turns: Vec<AgentTurn> = Vec::new();

        info!(round, tick, order = order.unwrap_or(""), "Round starting");

        for agent in world.turn_order() {
            let kind = world
                .kind_of(&agent)
                .ok_or_else(|| SequenceError::UnknownActor(agent.clone()))?;
            let marine = world.marine(&agent).cloned();
            if marine.as_ref().is_some_and(|m| !m.is_alive()) {
                debug!(agent = %agent, round, "Skipping fallen marine");
                continue;
            }

            let recent = self.recent_events(&pending);
            let Some(request) = context::build_request(&world, &agent, &recent, order) else {
                return Err(SequenceError::UnknownActor(agent));
            };
            let profile = AgentProfile {
                kind,
                personality: request.personality,
                stress: request.stress,
                label: Some(agent.to_string()),
            };

            let mut action = self.decide(source, &request, &profile).await;
            let mut compliance = None;
            if let (Some(marine), Some(order)) = (marine.as_ref(), order) {
                let check = check_compliance(
                    action.action,
                    action.target.as_deref(),
                    marine,
                    Some(order),
                    &self.rules,
                );
                if !action.fallback_used && self.disobeys(marine, &check) {
                    info!(
                        agent = %agent,
                        proposed = %action.action,
                        confidence = check.confidence,
                        "Marine disobeyed the order"
                    );
                    action = self.validator.fallback(
                        &profile,
                        FallbackReason::Disobeyed,
                        action.retry_count,
                    );
                }
                compliance = Some(check);
            }

            let event =
                resolution::resolve(&world, &agent, kind, &action, tick, &mut self.rng)
                    .with_detail("round", round);
            let applied = match squad_world::apply(&mut world, &event) {
                Ok(()) => true,
                Err(error) => {
                    debug!(agent = %agent, tick, error = %error, "Event recorded without effect");
                    false
                }
            };
            let event = event.with_result(turn_result(&action, compliance.as_ref(), applied));
            info!(
                agent = %agent,
                tick,
                action = %event.event_type,
                target = event.target.as_deref().unwrap_or(""),
                fallback = action.fallback_used,
                applied,
                "Turn resolved"
            );

            pending.push(event.clone());
            turns.push(AgentTurn {
                agent,
                kind,
                event,
                action,
                compliance,
                applied,
            });
            tick = tick.saturating_add(1);
        }

        self.submit_round(pending)?;
        self.round = round;
        let summary = RoundSummary { round, turns };
        self.broadcast(&summary, order);
        info!(
            round,
            turns = summary.turns.len(),
            fallbacks = summary.fallbacks(),
            "Round complete"
        );
        Ok(summary)
    }

    /// The last `recent_event_window` events, counting this round's
    /// not-yet-recorded ones.
    fn recent_events(&self, pending: &[Event]) -> Vec<Event> {
        let window = self.recent_event_window;
        let from_pending = pending.len().min(window);
        let from_log = window.saturating_sub(from_pending);
        let pending_tail = pending
            .get(pending.len().saturating_sub(from_pending)..)
            .unwrap_or_default();
        self.log
            .last_n(from_log)
            .iter()
            .chain(pending_tail)
            .cloned()
            .collect()
    }

    /// Ask the source for a decision, re-asking while the answer fails to
    /// decode and attempts remain. Timeouts and source failures fall back
    /// immediately.
    async fn decide<S: DecisionSource>(
        &self,
        source: &mut S,
        request: &squad_types::DecisionRequest,
        profile: &AgentProfile,
    ) -> ValidatedAction {
        let max_retries = self.validator.max_retries();
        let mut attempt: u32 = 0;
        loop {
            let raw: RawAction = match timeout(self.decision_timeout, source.decide(request)).await
            {
                Ok(Ok(raw)) => raw,
                Ok(Err(DecisionError::Timeout { .. })) | Err(_) => {
                    warn!(
                        agent = %request.agent_id,
                        timeout_ms = self.decision_timeout.as_millis(),
                        "Decision deadline exceeded, using fallback"
                    );
                    return self
                        .validator
                        .fallback(profile, FallbackReason::DecisionTimeout, attempt);
                }
                Ok(Err(error)) => {
                    warn!(
                        agent = %request.agent_id,
                        error = %error,
                        "Decision source failed, using fallback"
                    );
                    return self.validator.fallback(
                        profile,
                        FallbackReason::DecisionFailed(error.to_string()),
                        attempt,
                    );
                }
            };

            let next = attempt.saturating_add(1);
            if next < max_retries
                && let Err(reason) = decode(&raw, profile.kind)
            {
                debug!(
                    agent = %request.agent_id,
                    attempt = next,
                    reason = %reason,
                    "Proposal rejected, asking again"
                );
                attempt = next;
                continue;
            }
            return self.validator.validate(&raw, profile, attempt);
        }
    }

    /// Roll against the marine's compliance when the action does not
    /// follow the order.
    fn disobeys(&mut self, marine: &Marine, check: &ComplianceCheck) -> bool {
        if check.approved {
            return false;
        }
        let chance = (1.0 - marine.compliance).clamp(0.0, 1.0);
        self.rng.random_bool(chance)
    }

    fn broadcast(&mut self, summary: &RoundSummary, order: Option<&str>) {
        let round = summary.round;
        if let Some(order) = order {
            self.radio
                .push(RadioMessage::new(round, MessageKind::Commander, COMMANDER, order));
        }
        for turn in &summary.turns {
            if turn.event.event_type == EventType::Report {
                self.radio.push(RadioMessage::new(
                    round,
                    MessageKind::Dialogue,
                    turn.agent.as_str(),
                    turn.action.reasoning.clone(),
                ));
            }
            self.radio.push(RadioMessage::new(
                round,
                MessageKind::Action,
                turn.agent.as_str(),
                turn.narration(),
            ));
            if let Some(reason) = &turn.action.fallback_reason {
                self.radio.push(RadioMessage::new(
                    round,
                    MessageKind::System,
                    turn.agent.as_str(),
                    format!(
                        "{} fell back to {}: {reason}",
                        turn.agent, turn.action.action
                    ),
                ));
            }
        }
    }
}

/// The `result` payload recorded on each event.
fn turn_result(
    action: &ValidatedAction,
    compliance: Option<&ComplianceCheck>,
    applied: bool,
) -> Value {
    json!({
        "valid": action.is_valid,
        "fallback_used": action.fallback_used,
        "remapped": action.remapped,
        "retry_count": action.retry_count,
        "fallback_reason": action.fallback_reason.as_ref().map(FallbackReason::code),
        "compliance": compliance.map(|c| json!({
            "approved": c.approved,
            "confidence": c.confidence,
            "reason": c.reason,
        })),
        "applied": applied,
    })
}
