//! End-to-end round behavior of the turn sequencer.
//!
//! Every round must end with one event per living agent in phase order,
//! whatever the decision source does: answer well, answer garbage, fail,
//! or hang past the deadline.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::time::Duration;

use squad_agents::FallbackReason;
use squad_core::{
    DecisionError, DecisionSource, MessageKind, MockDecisionSource, ScriptedDecisionSource,
    SequenceError, SessionConfig, SessionMode, StubDecisionSource, TurnSequencer,
};
use squad_events::EventLog;
use squad_types::{AgentKind, DecisionRequest, Event, EventType, RawAction};
use squad_world::scenario::{ALIEN_ID, DIRECTOR_ID};

/// Never answers within any reasonable deadline.
struct Stalled;

impl DecisionSource for Stalled {
    async fn decide(&mut self, _request: &DecisionRequest) -> Result<RawAction, DecisionError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(RawAction::object("move", None, "too late"))
    }
}

/// Marines always propose the same action; everyone else gets the stub.
struct Insistent {
    marine_action: &'static str,
    stub: StubDecisionSource,
}

impl DecisionSource for Insistent {
    async fn decide(&mut self, request: &DecisionRequest) -> Result<RawAction, DecisionError> {
        if request.agent_kind == AgentKind::Marine {
            Ok(RawAction::object(self.marine_action, None, "my call"))
        } else {
            self.stub.decide(request).await
        }
    }
}

fn actors(events: &[Event]) -> Vec<&str> {
    events.iter().map(|e| e.actor.as_str()).collect()
}

fn fallback_reason(event: &Event) -> Option<&str> {
    event
        .result
        .as_ref()
        .and_then(|r| r.get("fallback_reason"))
        .and_then(|r| r.as_str())
}

#[tokio::test]
async fn stub_round_records_one_event_per_agent_in_phase_order() {
    let mut sequencer = TurnSequencer::new(&SessionConfig::default());
    let summary = sequencer
        .run_round(&mut StubDecisionSource::new(), Some("Move out"))
        .await
        .unwrap();

    assert_eq!(summary.round, 1);
    assert_eq!(sequencer.round(), 1);
    let log = sequencer.log().all();
    assert_eq!(
        actors(log),
        vec!["hudson", "hicks", "vasquez", ALIEN_ID, DIRECTOR_ID]
    );
    assert!(log.windows(2).all(|w| w[0].tick < w[1].tick));
    assert_eq!(summary.fallbacks(), 0);
    assert_eq!(summary.narration().len(), 5);
    assert!(log.iter().all(|e| e.detail_u64("round") == Some(1)));
}

#[tokio::test]
async fn timeouts_fall_back_without_blocking_the_round() {
    let mut config = SessionConfig::default();
    config.session.decision_timeout_ms = 20;
    let mut sequencer = TurnSequencer::new(&config);

    let summary = sequencer.run_round(&mut Stalled, None).await.unwrap();

    assert_eq!(summary.turns.len(), 5);
    assert_eq!(summary.fallbacks(), 5);
    for turn in &summary.turns {
        assert_eq!(turn.action.fallback_reason, Some(FallbackReason::DecisionTimeout));
        assert_eq!(fallback_reason(&turn.event), Some("decision_timeout"));
    }
    let types: Vec<EventType> = summary.events().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            EventType::Move,
            EventType::Search,
            EventType::Move,
            EventType::Sneak,
            EventType::Nudge
        ]
    );
}

#[tokio::test]
async fn garbage_is_re_asked_until_the_allowance_runs_out() {
    let mut sequencer = TurnSequencer::new(&SessionConfig::default());
    let mut source = ScriptedDecisionSource::new()
        .push("hudson", "not json at all")
        .push("hudson", serde_json::json!({"action": "teleport", "reasoning": "x"}))
        .push("hudson", RawAction::object("cover", None, "Digging in."))
        .push("hicks", "{{")
        .push("hicks", "still broken")
        .push("hicks", "}}")
        .push("hicks", RawAction::object("report", None, "never asked"));

    let summary = sequencer.run_round(&mut source, None).await.unwrap();

    let hudson = &summary.turns[0];
    assert!(hudson.action.is_valid);
    assert_eq!(hudson.event.event_type, EventType::Cover);
    assert_eq!(hudson.action.retry_count, 2);

    let hicks = &summary.turns[1];
    assert!(hicks.action.fallback_used);
    assert_eq!(hicks.action.retry_count, 3);
    assert_eq!(hicks.event.event_type, EventType::Search);
    assert_eq!(source.remaining(&"hicks".into()), 1);

    let vasquez = &summary.turns[2];
    assert!(matches!(
        vasquez.action.fallback_reason,
        Some(FallbackReason::DecisionFailed(_))
    ));
}

#[tokio::test]
async fn director_message_is_remapped_to_nudge() {
    let mut sequencer = TurnSequencer::new(&SessionConfig::default());
    let mut source = ScriptedDecisionSource::new().push(
        DIRECTOR_ID,
        RawAction::object("message", Some("hicks"), "Something moves in the vents."),
    );

    let summary = sequencer.run_round(&mut source, None).await.unwrap();
    let director = summary.turns.last().unwrap();
    assert_eq!(director.event.event_type, EventType::Nudge);
    assert!(director.action.is_valid);
    assert!(director.action.remapped);
    assert_eq!(director.event.target.as_deref(), Some("hicks"));

    let hicks = sequencer.snapshot().marine(&"hicks".into()).unwrap().stress;
    assert!(hicks >= 0.5);
}

#[test]
fn director_before_marine_is_rejected_without_appending() {
    let mut sequencer = TurnSequencer::new(&SessionConfig::default());
    let round = vec![
        Event::new(0, EventType::Nudge, DIRECTOR_ID),
        Event::new(1, EventType::Move, "hudson").with_target("Shuttle Bay"),
    ];
    let result = sequencer.submit_round(round);
    assert!(matches!(result, Err(SequenceError::PhaseOutOfOrder { .. })));
    assert_eq!(sequencer.log().len(), 0);
}

#[tokio::test]
async fn ordered_actions_are_never_overridden() {
    let mut sequencer = TurnSequencer::new(&SessionConfig::default());
    let mut source = Insistent {
        marine_action: "search",
        stub: StubDecisionSource::new(),
    };
    for _ in 0..10 {
        let summary = sequencer
            .run_round(&mut source, Some("Search everything"))
            .await
            .unwrap();
        for turn in summary.turns.iter().filter(|t| t.kind == AgentKind::Marine) {
            let check = turn.compliance.as_ref().unwrap();
            assert!(check.approved);
            assert!(!turn.action.fallback_used);
        }
    }
}

#[tokio::test]
async fn low_compliance_marines_sometimes_disobey() {
    let mut sequencer = TurnSequencer::new(&SessionConfig::default());
    let mut source = Insistent {
        marine_action: "cover",
        stub: StubDecisionSource::new(),
    };
    let mut disobeyed = 0;
    let mut obeyed = 0;
    for _ in 0..30 {
        let summary = sequencer
            .run_round(&mut source, Some("Search the cabinet"))
            .await
            .unwrap();
        let vasquez = summary
            .turns
            .iter()
            .find(|t| t.agent.as_str() == "vasquez")
            .unwrap();
        assert!(!vasquez.compliance.as_ref().unwrap().approved);
        if vasquez.action.fallback_reason == Some(FallbackReason::Disobeyed) {
            disobeyed += 1;
        } else {
            obeyed += 1;
        }
    }
    assert!(disobeyed > 0, "vasquez never disobeyed");
    assert!(obeyed > 0, "vasquez always disobeyed");
}

#[tokio::test]
async fn fallen_marines_are_skipped() {
    let log = EventLog::restore(vec![
        Event::new(0, EventType::Attack, ALIEN_ID)
            .with_target("hudson")
            .with_detail("damage", 12_u64),
    ])
    .unwrap();
    let mut sequencer = TurnSequencer::with_log(log, &SessionConfig::default());
    let summary = sequencer
        .run_round(&mut StubDecisionSource::new(), None)
        .await
        .unwrap();
    assert!(summary.turns.iter().all(|t| t.agent.as_str() != "hudson"));
    assert_eq!(summary.turns.len(), 4);
    assert_eq!(summary.turns[0].event.tick, 1);
}

#[tokio::test]
async fn mock_session_stays_within_the_rules() {
    let mut config = SessionConfig::default();
    config.session.mode = SessionMode::Mock;
    config.session.seed = 1234;
    let mut sequencer = TurnSequencer::new(&config);
    let mut source = MockDecisionSource::new(99);

    for _ in 0..25 {
        let summary = sequencer.run_round(&mut source, Some("Find the sample")).await.unwrap();
        for turn in &summary.turns {
            assert!(turn.kind.permits(turn.event.event_type));
        }
    }

    let log = sequencer.log().all().to_vec();
    assert!(log.windows(2).all(|w| w[0].tick < w[1].tick));
    let world = sequencer.snapshot().clone();
    for marine in &world.agents.marines {
        assert!((0.0..=10.0).contains(&marine.stress));
        assert!(marine.health <= 10);
    }
}

#[tokio::test]
async fn exported_log_replays_to_the_same_world() {
    let mut config = SessionConfig::default();
    config.session.mode = SessionMode::Mock;
    let mut sequencer = TurnSequencer::new(&config);
    let mut source = MockDecisionSource::new(7);
    for _ in 0..8 {
        sequencer.run_round(&mut source, None).await.unwrap();
    }
    let live = sequencer.snapshot().clone();

    let json = sequencer.log().to_json().unwrap();
    let restored = EventLog::from_json(&json).unwrap();
    let replayed = squad_world::derive_state(restored.all());

    assert_eq!(replayed.zones, live.zones);
    assert_eq!(replayed.agents.alien, live.agents.alien);
    for (a, b) in replayed.agents.marines.iter().zip(&live.agents.marines) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.health, b.health);
        assert_eq!(a.inventory, b.inventory);
        assert!((a.stress - b.stress).abs() < 1e-9);
    }

    let resumed = TurnSequencer::with_log(restored, &config);
    assert_eq!(resumed.round(), 8);
}

#[tokio::test]
async fn radio_carries_orders_reports_and_fallbacks() {
    let mut config = SessionConfig::default();
    config.session.decision_timeout_ms = 20;
    let mut sequencer = TurnSequencer::new(&config);
    let mut source = ScriptedDecisionSource::new().push(
        "hudson",
        RawAction::object("report", None, "Shuttle secure, moving up."),
    );
    sequencer.run_round(&mut source, Some("Report in")).await.unwrap();

    let radio = sequencer.radio();
    let kinds: Vec<MessageKind> = radio.round(1).map(|m| m.kind).collect();
    assert_eq!(kinds.first(), Some(&MessageKind::Commander));
    assert!(radio
        .all()
        .iter()
        .any(|m| m.kind == MessageKind::Dialogue && m.content == "Shuttle secure, moving up."));
    assert!(radio.all().iter().any(|m| m.kind == MessageKind::System));

    let transcript = squad_core::radio::transcript(sequencer.log().all());
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].round, Some(1));
}
