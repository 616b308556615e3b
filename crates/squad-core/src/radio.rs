//! The radio log: a human-readable side channel next to the event log.
//!
//! Commander orders, marine reports, per-event narration and fallback
//! explanations land here. Nothing reads the radio log to change the world;
//! it exists for the UI and the console. Report dialogue can also be
//! rebuilt from the events alone with [`transcript`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use squad_types::{Event, EventType};
use ts_rs::TS;

/// What a radio message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum MessageKind {
    /// An order from the commander.
    Commander,
    /// Something an agent said over the radio.
    Dialogue,
    /// Narration of a recorded event.
    Action,
    /// Notes from the simulation itself, such as fallbacks.
    System,
}

/// One line on the radio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RadioMessage {
    /// Round the message belongs to.
    pub round: u64,
    /// Message category.
    pub kind: MessageKind,
    /// Who is speaking.
    pub author: String,
    /// The text.
    pub content: String,
    /// Wall-clock time the message was logged.
    pub logged_at: DateTime<Utc>,
}

impl RadioMessage {
    /// A message stamped with the current time.
    pub fn new(
        round: u64,
        kind: MessageKind,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            round,
            kind,
            author: author.into(),
            content: content.into(),
            logged_at: Utc::now(),
        }
    }
}

/// Append-only list of radio messages.
#[derive(Debug, Clone, Default)]
pub struct RadioLog {
    messages: Vec<RadioMessage>,
}

impl RadioLog {
    /// An empty radio log.
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Record a message.
    pub fn push(&mut self, message: RadioMessage) {
        self.messages.push(message);
    }

    /// Every message, oldest first.
    pub fn all(&self) -> &[RadioMessage] {
        &self.messages
    }

    /// Messages from one round.
    pub fn round(&self, round: u64) -> impl Iterator<Item = &RadioMessage> {
        self.messages.iter().filter(move |m| m.round == round)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been said yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A report recovered from the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transmission {
    /// Tick of the report event.
    pub tick: u64,
    /// Round recorded on the event, if any.
    pub round: Option<u64>,
    /// The reporting agent.
    pub author: String,
    /// What was said.
    pub content: String,
}

/// Rebuild marine dialogue from `report` events.
pub fn transcript(events: &[Event]) -> Vec<Transmission> {
    events
        .iter()
        .filter(|e| e.event_type == EventType::Report)
        .map(|e| Transmission {
            tick: e.tick,
            round: e.detail_u64("round"),
            author: e.actor.to_string(),
            content: e
                .detail_str("message")
                .or_else(|| e.detail_str("reasoning"))
                .unwrap_or_default()
                .to_owned(),
        })
        .collect()
}
