//! Enumeration types for the squad simulation.
//!
//! The event enumeration doubles as the action vocabulary: every validated
//! action is recorded as exactly one event of the same name, so an agent's
//! permitted action set is a subset of [`EventType`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event / action vocabulary
// ---------------------------------------------------------------------------

/// The fixed enumeration of event (and action) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    // --- Marine ---
    /// Relocate to an adjacent zone.
    Move,
    /// Search a container item, emptying it.
    Search,
    /// Pick up an item, unlock a door or console, or drop cargo.
    Interact,
    /// Attack another agent (marine or alien).
    Attack,
    /// Hunker down; raises stress.
    Cover,
    /// Radio chatter; no world mutation.
    Report,

    // --- Alien ---
    /// Move while staying hidden.
    Sneak,
    /// Strike from hiding, revealing position.
    Ambush,
    /// Pursue openly, revealing position.
    Hunt,
    /// Stay concealed, optionally shifting zones.
    Lurk,
    /// Follow a marine's zone while staying concealed.
    Stalk,
    /// Conceal without moving.
    Hide,

    // --- Director ---
    /// Environmental hazard in a zone.
    Hazard,
    /// Subtle stress nudge on one marine or the whole squad.
    Nudge,
    /// Global tension increase.
    Escalate,
    /// Expose hidden items in a zone.
    Reveal,
    /// Cut a marine off: door lock plus stress spike.
    Isolate,
    /// Stress spike plus forced relocation.
    Panic,

    /// An event type this build does not recognize (written by a newer
    /// version). The log refuses to append it; the reducer skips it.
    #[serde(other)]
    Unknown,
}

impl EventType {
    /// Every recognized event type, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::Move,
        Self::Search,
        Self::Interact,
        Self::Attack,
        Self::Cover,
        Self::Report,
        Self::Sneak,
        Self::Ambush,
        Self::Hunt,
        Self::Lurk,
        Self::Stalk,
        Self::Hide,
        Self::Hazard,
        Self::Nudge,
        Self::Escalate,
        Self::Reveal,
        Self::Isolate,
        Self::Panic,
    ];

    /// The wire name of this type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Search => "search",
            Self::Interact => "interact",
            Self::Attack => "attack",
            Self::Cover => "cover",
            Self::Report => "report",
            Self::Sneak => "sneak",
            Self::Ambush => "ambush",
            Self::Hunt => "hunt",
            Self::Lurk => "lurk",
            Self::Stalk => "stalk",
            Self::Hide => "hide",
            Self::Hazard => "hazard",
            Self::Nudge => "nudge",
            Self::Escalate => "escalate",
            Self::Reveal => "reveal",
            Self::Isolate => "isolate",
            Self::Panic => "panic",
            Self::Unknown => "unknown",
        }
    }

    /// Look up a recognized type by its exact wire name.
    ///
    /// Returns `None` for anything outside the enumeration, including the
    /// literal `"unknown"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Whether this is one of the alien-class events that alone may move or
    /// conceal the alien.
    pub const fn is_alien_class(self) -> bool {
        matches!(
            self,
            Self::Sneak | Self::Ambush | Self::Hunt | Self::Lurk | Self::Stalk | Self::Hide
        )
    }

    /// Whether this is a director intervention.
    pub const fn is_director_class(self) -> bool {
        matches!(
            self,
            Self::Hazard | Self::Nudge | Self::Escalate | Self::Reveal | Self::Isolate | Self::Panic
        )
    }

    /// Whether an event of this type means nothing without a `target`.
    ///
    /// Types that can legitimately come up empty (a search of a bare room,
    /// an attack with no prey in reach, a squad-wide nudge) are not listed.
    pub const fn requires_target(self) -> bool {
        matches!(
            self,
            Self::Move | Self::Stalk | Self::Hazard | Self::Reveal | Self::Isolate | Self::Panic
        )
    }
}

impl core::fmt::Display for EventType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// The class of an agent.
///
/// Declaration order is the phase order within a round: marines act first,
/// then the alien, then the director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AgentKind {
    /// A squad member taking orders from the commander.
    Marine,
    /// The hostile creature.
    Alien,
    /// The meta-agent shaping tension.
    Director,
}

const MARINE_ACTIONS: [EventType; 6] = [
    EventType::Move,
    EventType::Search,
    EventType::Interact,
    EventType::Attack,
    EventType::Cover,
    EventType::Report,
];

const ALIEN_ACTIONS: [EventType; 7] = [
    EventType::Sneak,
    EventType::Attack,
    EventType::Stalk,
    EventType::Ambush,
    EventType::Hide,
    EventType::Hunt,
    EventType::Lurk,
];

const DIRECTOR_ACTIONS: [EventType; 6] = [
    EventType::Hazard,
    EventType::Escalate,
    EventType::Nudge,
    EventType::Reveal,
    EventType::Isolate,
    EventType::Panic,
];

impl AgentKind {
    /// All agent kinds in phase order.
    pub const ALL: [Self; 3] = [Self::Marine, Self::Alien, Self::Director];

    /// The actions this kind of agent may take.
    pub const fn permitted_actions(self) -> &'static [EventType] {
        match self {
            Self::Marine => &MARINE_ACTIONS,
            Self::Alien => &ALIEN_ACTIONS,
            Self::Director => &DIRECTOR_ACTIONS,
        }
    }

    /// Whether `action` is in this kind's permitted set.
    pub fn permits(self, action: EventType) -> bool {
        self.permitted_actions().contains(&action)
    }

    /// The lowercase label used in prompts and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Marine => "marine",
            Self::Alien => "alien",
            Self::Director => "director",
        }
    }
}

impl core::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "marine" => Ok(Self::Marine),
            "alien" => Ok(Self::Alien),
            "director" => Ok(Self::Director),
            other => Err(format!("unknown agent kind: {other}")),
        }
    }
}

/// A marine's temperament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Personality {
    /// Prefers moving, attacking, and grabbing things.
    Aggressive,
    /// Prefers searching, cover, and reporting.
    Cautious,
}

impl Personality {
    /// The actions this temperament gravitates toward.
    pub const fn preferred_actions(self) -> &'static [EventType] {
        match self {
            Self::Aggressive => &[EventType::Move, EventType::Attack, EventType::Interact],
            Self::Cautious => &[EventType::Search, EventType::Cover, EventType::Report],
        }
    }

    /// The lowercase label used in prompts and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Cautious => "cautious",
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The state of an item or sub-item in a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum ItemStatus {
    /// A container that still holds contents.
    Full,
    /// A searched container.
    Empty,
    /// A locked door or console.
    Locked,
    /// An unlocked door or console.
    Unlocked,
    /// Lying in the open, can be picked up.
    Present,
    /// Not yet discovered.
    Hidden,
    /// In an agent's inventory.
    Carried,
    /// A console that has been read.
    Accessed,
    /// Spent or delivered.
    Used,
}

impl ItemStatus {
    /// Wire name of the state.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Empty => "empty",
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Present => "present",
            Self::Hidden => "hidden",
            Self::Carried => "carried",
            Self::Accessed => "accessed",
            Self::Used => "used",
        }
    }
}

impl core::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permitted_sets_match_action_classes() {
        for action in AgentKind::Alien.permitted_actions() {
            assert!(action.is_alien_class() || *action == EventType::Attack);
        }
        for action in AgentKind::Director.permitted_actions() {
            assert!(action.is_director_class());
        }
        assert!(AgentKind::Marine.permits(EventType::Report));
        assert!(!AgentKind::Marine.permits(EventType::Sneak));
        assert!(!AgentKind::Director.permits(EventType::Attack));
    }

    #[test]
    fn targetless_types_are_the_exception() {
        assert!(EventType::Move.requires_target());
        assert!(EventType::Isolate.requires_target());
        assert!(!EventType::Search.requires_target());
        assert!(!EventType::Nudge.requires_target());
        assert!(!EventType::Unknown.requires_target());
    }

    #[test]
    fn names_round_trip_through_from_name() {
        for t in EventType::ALL {
            assert_eq!(EventType::from_name(t.as_str()), Some(t));
        }
        assert_eq!(EventType::from_name("unknown"), None);
        assert_eq!(EventType::from_name("message"), None);
    }

    #[test]
    fn unrecognized_wire_name_deserializes_to_unknown() {
        let parsed: Result<EventType, _> = serde_json::from_str("\"teleport\"");
        assert!(matches!(parsed, Ok(EventType::Unknown)));
    }

    #[test]
    fn phase_order_follows_declaration() {
        assert!(AgentKind::Marine < AgentKind::Alien);
        assert!(AgentKind::Alien < AgentKind::Director);
    }

    #[test]
    fn agent_kind_parses_case_insensitively() {
        assert_eq!(" Alien ".parse::<AgentKind>().ok(), Some(AgentKind::Alien));
        assert!("synthetic".parse::<AgentKind>().is_err());
    }
}
