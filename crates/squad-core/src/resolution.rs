//! Turning a validated action into a concrete, replayable event.
//!
//! Validation guarantees the action is one the agent may take; it says
//! nothing about whether the target makes sense. This module fills in or
//! corrects targets from the current world, rolls any dice the action
//! needs, and writes every random outcome into the event's `details` so the
//! reducer never has to roll again.
//!
//! Skill checks are 2d6 plus a modifier against a difficulty threshold.

use std::collections::{BTreeMap, VecDeque};

use rand::Rng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use squad_agents::ValidatedAction;
use squad_types::{
    AgentId, AgentKind, Event, EventType, ItemState, ItemStatus, Marine, Personality,
    WorldSnapshot,
};
use squad_world::reducer::{NUDGE_MAX, NUDGE_MIN};
use squad_world::scenario::{SHUTTLE, WIN_ITEM};

/// Smallest damage the alien deals on a hit.
pub const ALIEN_DAMAGE_MIN: u64 = 2;
/// Largest damage the alien deals on a hit.
pub const ALIEN_DAMAGE_MAX: u64 = 5;

/// How hard a skill check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Threshold 6.
    Trivial,
    /// Threshold 8.
    Easy,
    /// Threshold 10.
    Moderate,
    /// Threshold 12.
    Hard,
    /// Threshold 14.
    Extreme,
}

impl Difficulty {
    /// The total a check must reach.
    pub const fn threshold(self) -> u8 {
        match self {
            Self::Trivial => 6,
            Self::Easy => 8,
            Self::Moderate => 10,
            Self::Hard => 12,
            Self::Extreme => 14,
        }
    }

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trivial => "trivial",
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
        }
    }
}

/// The outcome of one 2d6 check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillCheck {
    /// Sum of the two dice.
    pub roll: u8,
    /// Bonus added to the roll.
    pub modifier: u8,
    /// What the total had to reach.
    pub difficulty: Difficulty,
    /// Whether `roll + modifier` met the threshold.
    pub success: bool,
}

/// Roll 2d6, add `modifier`, and compare against `difficulty`.
pub fn skill_check(rng: &mut SmallRng, modifier: u8, difficulty: Difficulty) -> SkillCheck {
    let roll = rng.random_range(1..=6_u8).saturating_add(rng.random_range(1..=6_u8));
    SkillCheck {
        roll,
        modifier,
        difficulty,
        success: roll.saturating_add(modifier) >= difficulty.threshold(),
    }
}

/// Attack bonus a marine's temperament gives.
pub const fn attack_modifier(personality: Personality) -> u8 {
    match personality {
        Personality::Aggressive => 2,
        Personality::Cautious => 1,
    }
}

/// Build the event for `action`, resolving targets and rolling dice.
///
/// The returned event carries `details.reasoning` and whatever keys the
/// reducer needs for this action type. It has no `result` yet. Types that
/// must name a target always get one: a marine with nowhere to go holds
/// position, and an alien or director move with no living marine to act on
/// becomes `lurk` or `escalate`.
pub fn resolve(
    world: &WorldSnapshot,
    actor: &AgentId,
    kind: AgentKind,
    action: &ValidatedAction,
    tick: u64,
    rng: &mut SmallRng,
) -> Event {
    let event = Event::new(tick, action.action, actor.clone())
        .with_detail("reasoning", action.reasoning.clone());
    let requested = action.target.as_deref().map(str::trim).filter(|t| !t.is_empty());

    match (kind, action.action) {
        (AgentKind::Marine, EventType::Move) => marine_move(world, actor, requested, event, rng),
        (AgentKind::Marine, EventType::Search) => search(world, actor, requested, event),
        (AgentKind::Marine, EventType::Interact) => interact(world, actor, requested, event),
        (AgentKind::Marine, EventType::Attack) => marine_attack(world, actor, event, rng),
        (AgentKind::Marine, EventType::Report) => {
            let message = action.reasoning.clone();
            with_target(event, requested).with_detail("message", message)
        }
        (AgentKind::Alien, _) => alien_action(world, requested, event, rng),
        (AgentKind::Director, _) => director_action(world, requested, event, rng),
        _ => event,
    }
}

fn with_target(event: Event, target: Option<&str>) -> Event {
    let Some(target) = target else {
        return event;
    };
    event.with_target(target)
}

/// The same event recorded as a different action of the actor's class.
fn instead(event: Event, action: EventType) -> Event {
    Event {
        event_type: action,
        ..event
    }
}

fn with_destination(event: Event, to: Option<String>) -> Event {
    let Some(to) = to else {
        return event;
    };
    event.with_detail("to", to)
}

// ---------------------------------------------------------------------------
// Map helpers
// ---------------------------------------------------------------------------

fn exits<'w>(world: &'w WorldSnapshot, zone: &str) -> &'w [String] {
    world
        .zones
        .get(zone)
        .map(|z| z.connections.as_slice())
        .unwrap_or_default()
}

fn random_exit(world: &WorldSnapshot, zone: &str, rng: &mut SmallRng) -> Option<String> {
    exits(world, zone).choose(rng).cloned()
}

/// The first step on a shortest path from `from` to `to`.
pub fn next_hop(world: &WorldSnapshot, from: &str, to: &str) -> Option<String> {
    if from == to || !world.zones.contains_key(to) {
        return None;
    }
    // Each visited zone remembers the first step taken from `from` to reach it.
    let mut first_step: BTreeMap<&str, &str> = BTreeMap::new();
    let mut queue = VecDeque::new();
    for exit in exits(world, from) {
        if first_step.insert(exit.as_str(), exit.as_str()).is_none() {
            queue.push_back(exit.as_str());
        }
    }
    while let Some(zone) = queue.pop_front() {
        let step = first_step.get(zone).copied()?;
        if zone == to {
            return Some(step.to_owned());
        }
        for exit in exits(world, zone) {
            if exit != from && !first_step.contains_key(exit.as_str()) {
                first_step.insert(exit.as_str(), step);
                queue.push_back(exit.as_str());
            }
        }
    }
    None
}

/// The zone holding a named item, if any zone does.
fn zone_of_item<'w>(world: &'w WorldSnapshot, item: &str) -> Option<&'w str> {
    world
        .zones
        .iter()
        .find(|(_, z)| z.items.contains_key(item))
        .map(|(name, _)| name.as_str())
}

fn living_marine<'w>(world: &'w WorldSnapshot, id: Option<&str>) -> Option<&'w Marine> {
    id.and_then(|id| world.marine(&AgentId::from(id)))
        .filter(|m| m.is_alive())
}

fn most_stressed(world: &WorldSnapshot) -> Option<&Marine> {
    world
        .agents
        .marines
        .iter()
        .filter(|m| m.is_alive())
        .max_by(|a, b| a.stress.total_cmp(&b.stress))
}

// ---------------------------------------------------------------------------
// Marines
// ---------------------------------------------------------------------------

fn marine_move(
    world: &WorldSnapshot,
    actor: &AgentId,
    requested: Option<&str>,
    event: Event,
    rng: &mut SmallRng,
) -> Event {
    let Some(from) = world.position_of(actor) else {
        return event;
    };
    // A target may name a zone, or an item whose zone to head for.
    let goal = requested.and_then(|t| {
        if world.zones.contains_key(t) {
            Some(t)
        } else {
            zone_of_item(world, t)
        }
    });
    let to = goal
        .and_then(|goal| {
            if exits(world, from).iter().any(|e| e == goal) {
                Some(goal.to_owned())
            } else {
                next_hop(world, from, goal)
            }
        })
        .or_else(|| random_exit(world, from, rng))
        .unwrap_or_else(|| from.to_owned());
    event
        .with_target(to.clone())
        .with_detail("from", from)
        .with_detail("to", to)
}

fn search(world: &WorldSnapshot, actor: &AgentId, requested: Option<&str>, event: Event) -> Event {
    let Some(zone_name) = world.position_of(actor) else {
        return event;
    };
    let event = event.with_detail("zone", zone_name);
    let Some(zone) = world.zones.get(zone_name) else {
        return event;
    };
    // Searching empties an item, so the sample is never a search target.
    let may_search = |name: &str| {
        name != WIN_ITEM
            && zone
                .items
                .get(name)
                .is_some_and(|i| i.state != ItemStatus::Carried)
    };
    let has_contents = |state: &ItemState| state.contents.as_ref().is_some_and(|c| !c.is_empty());
    let target = requested.filter(|t| may_search(t)).or_else(|| {
        zone.items
            .iter()
            .find(|(name, state)| has_contents(state) && may_search(name))
            .map(|(name, _)| name.as_str())
    });
    with_target(event, target)
}

fn interact(world: &WorldSnapshot, actor: &AgentId, requested: Option<&str>, event: Event) -> Event {
    let Some(marine) = world.marine(actor) else {
        return event;
    };
    let zone_name = marine.position.as_str();

    // Delivering cargo wins over everything else once aboard the shuttle.
    if zone_name == SHUTTLE {
        let cargo = requested
            .filter(|t| marine.inventory.iter().any(|i| i == t))
            .or_else(|| marine.inventory.iter().any(|i| i == WIN_ITEM).then_some(WIN_ITEM));
        if let Some(cargo) = cargo {
            return event
                .with_target(cargo)
                .with_detail("action", "drop")
                .with_detail("zone", zone_name);
        }
    }

    let event = event.with_detail("zone", zone_name);
    let Some(zone) = world.zones.get(zone_name) else {
        return event;
    };
    let fixture_open = |name: &str| {
        let fixture = match name {
            "door" => zone.door.as_ref(),
            "console" => zone.console.as_ref(),
            _ => None,
        };
        fixture.is_some_and(|f| matches!(f.state, ItemStatus::Locked | ItemStatus::Unlocked))
    };
    // Cargo delivered to the shuttle stays there.
    let delivered = |name: &str| zone_name == SHUTTLE && name == WIN_ITEM;
    let can_take = |name: &str| {
        !delivered(name)
            && zone
                .items
                .get(name)
                .is_some_and(|i| matches!(i.state, ItemStatus::Present | ItemStatus::Hidden))
    };

    let target = requested
        .filter(|t| fixture_open(t) || can_take(t))
        .or_else(|| {
            zone.items
                .iter()
                .find(|(name, i)| i.state == ItemStatus::Present && !delivered(name))
                .map(|(name, _)| name.as_str())
        })
        .or_else(|| ["door", "console"].into_iter().find(|f| fixture_open(f)));
    with_target(event, target)
}

fn marine_attack(world: &WorldSnapshot, actor: &AgentId, event: Event, rng: &mut SmallRng) -> Event {
    let alien = &world.agents.alien;
    let event = event.with_target(alien.id.as_str());
    let Some(marine) = world.marine(actor) else {
        return event;
    };
    if marine.position != alien.position {
        return event
            .with_detail("hit", false)
            .with_detail("outcome", "no target in range");
    }
    let difficulty = if alien.hidden {
        Difficulty::Hard
    } else {
        Difficulty::Moderate
    };
    let check = skill_check(rng, attack_modifier(marine.personality), difficulty);
    event
        .with_detail("roll", check.roll)
        .with_detail("modifier", check.modifier)
        .with_detail("difficulty", check.difficulty.as_str())
        .with_detail("hit", check.success)
}

// ---------------------------------------------------------------------------
// Alien
// ---------------------------------------------------------------------------

fn alien_damage(rng: &mut SmallRng) -> u64 {
    rng.random_range(ALIEN_DAMAGE_MIN..=ALIEN_DAMAGE_MAX)
}

/// The requested marine if alive and accepted by `near`, else the first
/// living marine `near` accepts.
fn prey<'w>(
    world: &'w WorldSnapshot,
    requested: Option<&str>,
    near: impl Fn(&Marine) -> bool,
) -> Option<&'w Marine> {
    living_marine(world, requested)
        .filter(|m| near(m))
        .or_else(|| world.agents.marines.iter().find(|m| m.is_alive() && near(m)))
}

fn alien_action(
    world: &WorldSnapshot,
    requested: Option<&str>,
    event: Event,
    rng: &mut SmallRng,
) -> Event {
    let here = world.agents.alien.position.as_str();
    match event.event_type {
        EventType::Attack => alien_attack(world, requested, event, rng),
        EventType::Ambush => ambush(world, requested, event, rng),
        EventType::Hunt | EventType::Stalk => {
            let Some(victim) = prey(world, requested, |_| true) else {
                return if event.event_type == EventType::Stalk {
                    instead(event, EventType::Lurk)
                } else {
                    event
                };
            };
            let event = event.with_target(victim.id.as_str());
            if event.event_type == EventType::Stalk {
                return event;
            }
            let to = next_hop(world, here, &victim.position).unwrap_or_else(|| here.to_owned());
            event.with_detail("to", to)
        }
        EventType::Sneak => with_destination(event, random_exit(world, here, rng)),
        EventType::Lurk if rng.random_bool(0.5) => {
            with_destination(event, random_exit(world, here, rng))
        }
        _ => event,
    }
}

/// Strike a living marine in the alien's own zone. Always hits.
fn alien_attack(
    world: &WorldSnapshot,
    requested: Option<&str>,
    event: Event,
    rng: &mut SmallRng,
) -> Event {
    let here = world.agents.alien.position.as_str();
    let Some(victim) = prey(world, requested, |m| m.position == here) else {
        return event
            .with_detail("hit", false)
            .with_detail("outcome", "no prey in reach");
    };
    event
        .with_target(victim.id.as_str())
        .with_detail("hit", true)
        .with_detail("damage", alien_damage(rng))
}

/// Leap on a living marine in the alien's zone or one next to it.
fn ambush(
    world: &WorldSnapshot,
    requested: Option<&str>,
    event: Event,
    rng: &mut SmallRng,
) -> Event {
    let here = world.agents.alien.position.as_str();
    let within_reach =
        |m: &Marine| m.position == here || exits(world, here).iter().any(|e| *e == m.position);
    let Some(victim) = prey(world, requested, within_reach) else {
        return event;
    };
    event
        .with_target(victim.id.as_str())
        .with_detail("to", victim.position.clone())
        .with_detail("hit", true)
        .with_detail("damage", alien_damage(rng))
}

// ---------------------------------------------------------------------------
// Director
// ---------------------------------------------------------------------------

fn director_action(
    world: &WorldSnapshot,
    requested: Option<&str>,
    event: Event,
    rng: &mut SmallRng,
) -> Event {
    let requested_zone = requested.filter(|t| world.zones.contains_key(*t));
    let alien_zone = world.agents.alien.position.as_str();
    let victim = living_marine(world, requested).or_else(|| most_stressed(world));

    match event.event_type {
        EventType::Nudge => {
            let amount = rng.random_range(NUDGE_MIN..=NUDGE_MAX);
            let target = living_marine(world, requested).map(|m| m.id.as_str());
            with_target(event, target).with_detail("amount", amount)
        }
        EventType::Hazard => {
            let zone = requested_zone
                .or_else(|| victim.map(|m| m.position.as_str()))
                .unwrap_or(alien_zone);
            event.with_target(zone)
        }
        EventType::Reveal => {
            let zone = requested_zone.or_else(|| {
                world
                    .zones
                    .iter()
                    .find(|(_, z)| z.items.values().any(|i| i.state == ItemStatus::Hidden))
                    .map(|(name, _)| name.as_str())
            });
            event.with_target(zone.unwrap_or(alien_zone))
        }
        EventType::Isolate => match victim {
            Some(marine) => event.with_target(marine.id.as_str()),
            None => instead(event, EventType::Escalate),
        },
        EventType::Panic => {
            let Some(marine) = victim else {
                return instead(event, EventType::Escalate);
            };
            let to = random_exit(world, &marine.position, rng);
            with_destination(event.with_target(marine.id.as_str()), to)
        }
        _ => event,
    }
}
