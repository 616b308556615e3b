//! The world reducer: folds the event log into a [`WorldSnapshot`].
//!
//! Derivation is pure. It clones the starting template, applies every event
//! in log order and returns the result; the same events always give a
//! value-equal snapshot. An event whose payload cannot be applied (missing
//! details, unknown zone, wrong actor) is skipped as a whole and the fold
//! carries on. Each transition checks everything it needs before it touches
//! the snapshot, so a skipped event leaves no partial effect.
//!
//! `search` and `interact` only act on the zone the actor is standing in:
//! an event whose `details.zone` differs from the actor's derived position
//! is skipped.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use squad_types::{
    AgentId, AgentKind, Event, EventType, ItemState, ItemStatus, Marine, WorldSnapshot,
};
use tracing::{debug, warn};

use crate::error::ReduceError;
use crate::scenario::{SHUTTLE, scenario};

/// Stress added by taking cover.
pub const COVER_STRESS: f64 = 1.0;
/// Lower bound of a nudge.
pub const NUDGE_MIN: f64 = 0.5;
/// Upper bound of a nudge.
pub const NUDGE_MAX: f64 = 1.5;
/// Stress added to every marine by an escalation.
pub const ESCALATE_STRESS: f64 = 1.5;
/// Stress added to marines caught in a hazard.
pub const HAZARD_STRESS: f64 = 1.0;
/// Stress added to an isolated marine.
pub const ISOLATE_STRESS: f64 = 2.0;
/// Stress added to a panicking marine.
pub const PANIC_STRESS: f64 = 2.5;

/// Derive the current world from the starting scenario and `events`.
pub fn derive_state(events: &[Event]) -> WorldSnapshot {
    derive_state_from(scenario(), events)
}

/// Derive a world from an explicit starting template.
///
/// The template is cloned; it is never modified.
pub fn derive_state_from(initial: &WorldSnapshot, events: &[Event]) -> WorldSnapshot {
    let mut world = initial.clone();
    for event in events {
        match apply(&mut world, event) {
            Ok(()) => {}
            Err(ReduceError::UnknownEventType) => {
                warn!(
                    tick = event.tick,
                    event_id = %event.id,
                    "Skipping event of unrecognized type"
                );
            }
            Err(err) => {
                debug!(
                    tick = event.tick,
                    event_id = %event.id,
                    event_type = %event.event_type,
                    reason = %err,
                    "Skipped event effect"
                );
            }
        }
    }
    world
}

/// Apply one event in place.
///
/// On error the snapshot is unchanged.
pub fn apply(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    match event.event_type {
        EventType::Move => apply_move(world, event),
        EventType::Search => apply_search(world, event),
        EventType::Interact => apply_interact(world, event),
        EventType::Attack => apply_attack(world, event),
        EventType::Cover => {
            marine_actor(world, event)?.adjust_stress(COVER_STRESS);
            Ok(())
        }
        EventType::Report => Ok(()),
        EventType::Sneak
        | EventType::Ambush
        | EventType::Hunt
        | EventType::Lurk
        | EventType::Stalk
        | EventType::Hide => apply_alien(world, event),
        EventType::Hazard
        | EventType::Nudge
        | EventType::Escalate
        | EventType::Reveal
        | EventType::Isolate
        | EventType::Panic => apply_director(world, event),
        EventType::Unknown => Err(ReduceError::UnknownEventType),
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

fn require_target(event: &Event) -> Result<&str, ReduceError> {
    event.target.as_deref().ok_or(ReduceError::MissingTarget)
}

fn wrong_class(event: &Event) -> ReduceError {
    ReduceError::WrongActorClass {
        actor: event.actor.clone(),
        event_type: event.event_type,
    }
}

fn marine_actor<'w>(
    world: &'w mut WorldSnapshot,
    event: &Event,
) -> Result<&'w mut Marine, ReduceError> {
    match world.kind_of(&event.actor) {
        Some(AgentKind::Marine) => world
            .marine_mut(&event.actor)
            .ok_or_else(|| ReduceError::UnknownAgent(event.actor.clone())),
        Some(_) => Err(wrong_class(event)),
        None => Err(ReduceError::UnknownAgent(event.actor.clone())),
    }
}

fn marine_position<'w>(world: &'w WorldSnapshot, event: &Event) -> Result<&'w str, ReduceError> {
    match world.kind_of(&event.actor) {
        Some(AgentKind::Marine) => world
            .marine(&event.actor)
            .map(|m| m.position.as_str())
            .ok_or_else(|| ReduceError::UnknownAgent(event.actor.clone())),
        Some(_) => Err(wrong_class(event)),
        None => Err(ReduceError::UnknownAgent(event.actor.clone())),
    }
}

/// The zone named in `details.zone`, checked against the actor's position.
fn actor_zone<'e>(world: &WorldSnapshot, event: &'e Event) -> Result<&'e str, ReduceError> {
    let zone = event
        .detail_str("zone")
        .ok_or(ReduceError::MissingDetail("zone"))?;
    if !world.zones.contains_key(zone) {
        return Err(ReduceError::UnknownZone(zone.to_owned()));
    }
    if marine_position(world, event)? != zone {
        return Err(ReduceError::ActorNotInZone {
            actor: event.actor.clone(),
            zone: zone.to_owned(),
        });
    }
    Ok(zone)
}

fn target_marine<'w>(world: &'w WorldSnapshot, event: &Event) -> Result<&'w Marine, ReduceError> {
    let target = AgentId::from(require_target(event)?);
    world
        .marine(&target)
        .ok_or(ReduceError::UnknownAgent(target))
}

// ---------------------------------------------------------------------------
// Marine transitions
// ---------------------------------------------------------------------------

fn apply_move(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    let to = event
        .detail_str("to")
        .or(event.target.as_deref())
        .ok_or(ReduceError::MissingTarget)?;
    if !world.zones.contains_key(to) {
        return Err(ReduceError::UnknownZone(to.to_owned()));
    }
    marine_actor(world, event)?.position = to.to_owned();
    Ok(())
}

/// Search an item in the actor's zone.
///
/// Any item that is not being carried ends up `empty`. A container's
/// contents become carried records in the same zone and join the
/// searcher's inventory; names the zone already holds stay in the
/// container.
fn apply_search(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    let item_name = require_target(event)?;
    let zone_name = actor_zone(world, event)?;
    let zone = world
        .zones
        .get_mut(zone_name)
        .ok_or_else(|| ReduceError::UnknownZone(zone_name.to_owned()))?;

    let contents = {
        let item = zone
            .items
            .get_mut(item_name)
            .ok_or_else(|| ReduceError::UnknownItem {
                zone: zone_name.to_owned(),
                item: item_name.to_owned(),
            })?;
        if item.state == ItemStatus::Carried {
            return Err(ReduceError::InvalidItemState {
                item: item_name.to_owned(),
                state: item.state,
            });
        }
        item.state = ItemStatus::Empty;
        item.contents.as_mut().map(std::mem::take)
    };

    let mut taken = Vec::new();
    if let Some(contents) = contents {
        let mut left = Vec::new();
        for name in contents {
            if zone.items.contains_key(&name) {
                left.push(name);
                continue;
            }
            let mut record = ItemState::new(ItemStatus::Carried);
            record.carried_by = Some(event.actor.clone());
            zone.items.insert(name.clone(), record);
            taken.push(name);
        }
        if let Some(item) = zone.items.get_mut(item_name) {
            item.contents = Some(left);
        }
    }

    if let Some(marine) = world.marine_mut(&event.actor) {
        marine.inventory.extend(taken);
    }
    Ok(())
}

fn apply_interact(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    let target = require_target(event)?;
    if event.detail_str("action") == Some("drop") {
        return drop_item(world, event, target);
    }
    let zone_name = actor_zone(world, event)?;
    let zone = world
        .zones
        .get_mut(zone_name)
        .ok_or_else(|| ReduceError::UnknownZone(zone_name.to_owned()))?;

    let fixture = match target {
        "door" => Some(zone.door.as_mut()),
        "console" => Some(zone.console.as_mut()),
        _ => None,
    };
    if let Some(fixture) = fixture {
        let fixture = fixture.ok_or_else(|| ReduceError::UnknownItem {
            zone: zone_name.to_owned(),
            item: target.to_owned(),
        })?;
        fixture.state = match fixture.state {
            ItemStatus::Locked => ItemStatus::Unlocked,
            ItemStatus::Unlocked if target == "console" => ItemStatus::Accessed,
            state => {
                return Err(ReduceError::InvalidItemState {
                    item: target.to_owned(),
                    state,
                });
            }
        };
        return Ok(());
    }

    let item = zone
        .items
        .get_mut(target)
        .ok_or_else(|| ReduceError::UnknownItem {
            zone: zone_name.to_owned(),
            item: target.to_owned(),
        })?;
    if !matches!(item.state, ItemStatus::Present | ItemStatus::Hidden) {
        return Err(ReduceError::InvalidItemState {
            item: target.to_owned(),
            state: item.state,
        });
    }
    item.state = ItemStatus::Carried;
    item.carried_by = Some(event.actor.clone());

    if let Some(marine) = world.marine_mut(&event.actor) {
        marine.inventory.push(target.to_owned());
    }
    Ok(())
}

/// Drop carried cargo in the shuttle.
///
/// The carried entry is retired as `used` and a fresh `present` copy appears
/// in the shuttle, keeping any blood marking.
fn drop_item(world: &mut WorldSnapshot, event: &Event, item: &str) -> Result<(), ReduceError> {
    let position = marine_position(world, event)?;
    if position != SHUTTLE || !world.zones.contains_key(SHUTTLE) {
        return Err(ReduceError::ActorNotInZone {
            actor: event.actor.clone(),
            zone: SHUTTLE.to_owned(),
        });
    }
    let carrying = world
        .marine(&event.actor)
        .is_some_and(|m| m.inventory.iter().any(|i| i == item));
    if !carrying {
        return Err(ReduceError::NotCarrying {
            actor: event.actor.clone(),
            item: item.to_owned(),
        });
    }

    let mut yellow_blood = None;
    let original = world
        .zones
        .values_mut()
        .flat_map(|z| z.items.iter_mut())
        .find(|(name, state)| {
            name.as_str() == item && state.carried_by.as_ref() == Some(&event.actor)
        });
    if let Some((_, state)) = original {
        yellow_blood = state.yellow_blood;
        state.state = ItemStatus::Used;
        state.carried_by = None;
    }

    if let Some(marine) = world.marine_mut(&event.actor) {
        if let Some(slot) = marine.inventory.iter().position(|i| i == item) {
            marine.inventory.remove(slot);
        }
    }

    let mut dropped = ItemState::new(ItemStatus::Present);
    dropped.yellow_blood = yellow_blood;
    if let Some(shuttle) = world.zones.get_mut(SHUTTLE) {
        shuttle.items.insert(item.to_owned(), dropped);
    }
    Ok(())
}

fn apply_attack(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    let target = AgentId::from(require_target(event)?);
    let attacker = world
        .kind_of(&event.actor)
        .ok_or_else(|| ReduceError::UnknownAgent(event.actor.clone()))?;
    if attacker == AgentKind::Director {
        return Err(wrong_class(event));
    }

    match world.kind_of(&target) {
        Some(AgentKind::Alien) => {
            if attacker == AgentKind::Alien {
                return Err(wrong_class(event));
            }
            if event.detail_bool("hit") == Some(true) {
                world.agents.alien.hidden = false;
            }
            Ok(())
        }
        Some(AgentKind::Marine) => {
            if event.detail_bool("hit") == Some(false) {
                return Ok(());
            }
            let damage = event
                .detail_u64("damage")
                .ok_or(ReduceError::MissingDetail("damage"))?;
            if let Some(marine) = world.marine_mut(&target) {
                marine.apply_damage(damage);
            }
            Ok(())
        }
        Some(AgentKind::Director) | None => Err(ReduceError::UnknownAgent(target)),
    }
}

// ---------------------------------------------------------------------------
// Alien transitions
// ---------------------------------------------------------------------------

/// Where an alien event sends the creature, if anywhere.
///
/// `details.to` wins; otherwise a zone target is the destination and a
/// marine target means that marine's zone.
fn alien_destination(world: &WorldSnapshot, event: &Event) -> Result<Option<String>, ReduceError> {
    if let Some(to) = event.detail_str("to") {
        return if world.zones.contains_key(to) {
            Ok(Some(to.to_owned()))
        } else {
            Err(ReduceError::UnknownZone(to.to_owned()))
        };
    }
    let Some(target) = event.target.as_deref() else {
        return Ok(None);
    };
    if world.zones.contains_key(target) {
        return Ok(Some(target.to_owned()));
    }
    world
        .marine(&AgentId::from(target))
        .map(|m| Some(m.position.clone()))
        .ok_or_else(|| ReduceError::UnknownZone(target.to_owned()))
}

fn apply_alien(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    if world.agents.alien.id != event.actor {
        return Err(wrong_class(event));
    }

    let destination = match event.event_type {
        EventType::Hide => None,
        EventType::Stalk => {
            require_target(event)?;
            alien_destination(world, event)?
        }
        EventType::Lurk => {
            let to = alien_destination(world, event)?;
            if let Some(to) = &to {
                let from = &world.agents.alien.position;
                let adjacent = world.zones.get(from).is_some_and(|z| z.connects_to(to));
                if to != from && !adjacent {
                    return Err(ReduceError::NotAdjacent {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
            to
        }
        _ => alien_destination(world, event)?,
    };
    let hidden = !matches!(event.event_type, EventType::Hunt | EventType::Ambush);

    let mut ambush_damage = None;
    if event.event_type == EventType::Ambush && event.detail_bool("hit") != Some(false) {
        if let (Some(damage), Ok(victim)) = (event.detail_u64("damage"), target_marine(world, event)) {
            ambush_damage = Some((victim.id.clone(), damage));
        }
    }

    let alien = &mut world.agents.alien;
    if let Some(to) = destination {
        alien.position = to;
    }
    alien.hidden = hidden;
    if let Some((victim, damage)) = ambush_damage {
        if let Some(marine) = world.marine_mut(&victim) {
            marine.apply_damage(damage);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Director transitions
// ---------------------------------------------------------------------------

/// The stress a nudge applies: the recorded amount clamped to the nudge
/// range, or a draw from an RNG seeded by the event's tick.
pub fn nudge_amount(event: &Event) -> f64 {
    event
        .detail_f64("amount")
        .filter(|a| a.is_finite())
        .map_or_else(
            || SmallRng::seed_from_u64(event.tick).random_range(NUDGE_MIN..=NUDGE_MAX),
            |a| a.clamp(NUDGE_MIN, NUDGE_MAX),
        )
}

fn apply_director(world: &mut WorldSnapshot, event: &Event) -> Result<(), ReduceError> {
    if world.agents.director.id != event.actor {
        return Err(wrong_class(event));
    }

    let note = match event.event_type {
        EventType::Hazard => {
            let zone = require_target(event)?;
            if !world.zones.contains_key(zone) {
                return Err(ReduceError::UnknownZone(zone.to_owned()));
            }
            for marine in world.agents.marines.iter_mut().filter(|m| m.position == zone) {
                marine.adjust_stress(HAZARD_STRESS);
            }
            format!("hazard in {zone}")
        }
        EventType::Nudge => {
            let amount = nudge_amount(event);
            if let Some(target) = event.target.as_deref() {
                let id = AgentId::from(target);
                world
                    .marine_mut(&id)
                    .ok_or(ReduceError::UnknownAgent(id))?
                    .adjust_stress(amount);
                format!("nudged {target} (+{amount:.2} stress)")
            } else {
                for marine in &mut world.agents.marines {
                    marine.adjust_stress(amount);
                }
                format!("nudged the squad (+{amount:.2} stress)")
            }
        }
        EventType::Escalate => {
            for marine in &mut world.agents.marines {
                marine.adjust_stress(ESCALATE_STRESS);
            }
            "escalated tension".to_owned()
        }
        EventType::Reveal => {
            let zone_name = require_target(event)?;
            let zone = world
                .zones
                .get_mut(zone_name)
                .ok_or_else(|| ReduceError::UnknownZone(zone_name.to_owned()))?;
            for item in zone.items.values_mut().filter(|i| i.state == ItemStatus::Hidden) {
                item.state = ItemStatus::Present;
            }
            format!("revealed {zone_name}")
        }
        EventType::Isolate => {
            let marine = target_marine(world, event)?;
            let (id, zone_name) = (marine.id.clone(), marine.position.clone());
            if let Some(door) = world
                .zones
                .get_mut(&zone_name)
                .and_then(|z| z.door.as_mut())
            {
                door.state = ItemStatus::Locked;
            }
            if let Some(marine) = world.marine_mut(&id) {
                marine.adjust_stress(ISOLATE_STRESS);
            }
            format!("isolated {id} in {zone_name}")
        }
        EventType::Panic => {
            let marine = target_marine(world, event)?;
            let id = marine.id.clone();
            let exits = world
                .zones
                .get(&marine.position)
                .map(|z| z.connections.as_slice())
                .unwrap_or_default();
            let requested = event.detail_str("to").filter(|to| exits.iter().any(|e| e.as_str() == *to));
            let to = requested
                .or_else(|| exits.first().map(String::as_str))
                .ok_or_else(|| ReduceError::NotAdjacent {
                    from: marine.position.clone(),
                    to: event.detail_str("to").unwrap_or_default().to_owned(),
                })?
                .to_owned();
            if let Some(marine) = world.marine_mut(&id) {
                marine.adjust_stress(PANIC_STRESS);
                marine.position.clone_from(&to);
            }
            format!("{id} panicked and fled to {to}")
        }
        _ => return Err(wrong_class(event)),
    };

    world.agents.director.adjustments.push(note);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scenario::{
        ALIEN_ID, COMMAND, CORRIDOR, DIRECTOR_ID, MEDBAY, SHUTTLE_BAY, STORAGE, VENTS, WIN_ITEM,
    };

    fn hudson() -> AgentId {
        AgentId::from("hudson")
    }

    fn walk(actor: &str, route: &[&str], first_tick: u64) -> Vec<Event> {
        route
            .iter()
            .zip(first_tick..)
            .map(|(zone, tick)| Event::new(tick, EventType::Move, actor).with_target(*zone))
            .collect()
    }

    #[test]
    fn move_updates_position() {
        let world = derive_state(&walk("hudson", &[SHUTTLE_BAY], 0));
        assert_eq!(world.marine(&hudson()).unwrap().position, SHUTTLE_BAY);
    }

    #[test]
    fn move_to_unknown_zone_is_skipped() {
        let mut world = scenario().clone();
        let event = Event::new(0, EventType::Move, "hudson").with_target("Reactor");
        assert_eq!(
            apply(&mut world, &event),
            Err(ReduceError::UnknownZone("Reactor".to_owned()))
        );
        assert_eq!(&world, scenario());
    }

    #[test]
    fn search_by_absent_actor_leaves_cabinet_unchanged() {
        let mut events = walk("hudson", &[SHUTTLE_BAY], 0);
        events.push(
            Event::new(1, EventType::Search, "hudson")
                .with_target("cabinet")
                .with_detail("zone", STORAGE),
        );
        let world = derive_state(&events);
        let cabinet = world.zones.get(STORAGE).unwrap().items.get("cabinet").unwrap();
        assert_eq!(cabinet.state, ItemStatus::Full);
        assert_eq!(cabinet.contents.as_ref().map(Vec::len), Some(2));
        assert!(world.marine(&hudson()).unwrap().inventory.is_empty());
    }

    #[test]
    fn search_in_place_drains_contents() {
        let mut events = walk("hicks", &[SHUTTLE_BAY, CORRIDOR, STORAGE], 0);
        events.push(
            Event::new(3, EventType::Search, "hicks")
                .with_target("cabinet")
                .with_detail("zone", STORAGE),
        );
        let world = derive_state(&events);
        let cabinet = world.zones.get(STORAGE).unwrap().items.get("cabinet").unwrap();
        assert_eq!(cabinet.state, ItemStatus::Empty);
        assert_eq!(cabinet.contents, Some(Vec::new()));
        let hicks = world.marine(&AgentId::from("hicks")).unwrap();
        assert_eq!(hicks.inventory, vec!["medkit".to_owned(), "ammo".to_owned()]);
        for name in ["medkit", "ammo"] {
            let record = world.zones.get(STORAGE).unwrap().items.get(name).unwrap();
            assert_eq!(record.state, ItemStatus::Carried);
            assert_eq!(record.carried_by, Some(hicks.id.clone()));
        }
    }

    #[test]
    fn search_empties_a_plain_item() {
        let mut events = walk("hicks", &[SHUTTLE_BAY, CORRIDOR, STORAGE], 0);
        events.push(
            Event::new(3, EventType::Search, "hicks")
                .with_target("flare")
                .with_detail("zone", STORAGE),
        );
        let world = derive_state(&events);
        let flare = world.zones.get(STORAGE).unwrap().items.get("flare").unwrap();
        assert_eq!(flare.state, ItemStatus::Empty);
        assert_eq!(flare.carried_by, None);
        assert!(world.marine(&AgentId::from("hicks")).unwrap().inventory.is_empty());
    }

    #[test]
    fn search_leaves_carried_items_alone() {
        let mut events = walk("hicks", &[SHUTTLE_BAY, CORRIDOR, STORAGE], 0);
        events.push(
            Event::new(3, EventType::Interact, "hicks")
                .with_target("flare")
                .with_detail("zone", STORAGE),
        );
        let mut world = derive_state(&events);
        let search = Event::new(4, EventType::Search, "hicks")
            .with_target("flare")
            .with_detail("zone", STORAGE);
        assert_eq!(
            apply(&mut world, &search),
            Err(ReduceError::InvalidItemState {
                item: "flare".to_owned(),
                state: ItemStatus::Carried,
            })
        );
        let flare = world.zones.get(STORAGE).unwrap().items.get("flare").unwrap();
        assert_eq!(flare.carried_by, Some(AgentId::from("hicks")));
    }

    #[test]
    fn pickup_and_drop_keep_both_sides_consistent() {
        let mut events = walk("vasquez", &[SHUTTLE_BAY, CORRIDOR, MEDBAY], 0);
        events.push(
            Event::new(3, EventType::Interact, "vasquez")
                .with_target(WIN_ITEM)
                .with_detail("zone", MEDBAY),
        );
        let world = derive_state(&events);
        let sample = world.zones.get(MEDBAY).unwrap().items.get(WIN_ITEM).unwrap();
        assert_eq!(sample.state, ItemStatus::Carried);
        assert_eq!(sample.carried_by, Some(AgentId::from("vasquez")));
        let vasquez = AgentId::from("vasquez");
        assert!(world.marine(&vasquez).unwrap().inventory.contains(&WIN_ITEM.to_owned()));

        events.extend(walk("vasquez", &[CORRIDOR, SHUTTLE_BAY, SHUTTLE], 4));
        events.push(
            Event::new(7, EventType::Interact, "vasquez")
                .with_target(WIN_ITEM)
                .with_detail("action", "drop"),
        );
        let world = derive_state(&events);
        let original = world.zones.get(MEDBAY).unwrap().items.get(WIN_ITEM).unwrap();
        assert_eq!(original.state, ItemStatus::Used);
        assert_eq!(original.carried_by, None);
        let dropped = world.zones.get(SHUTTLE).unwrap().items.get(WIN_ITEM).unwrap();
        assert_eq!(dropped.state, ItemStatus::Present);
        assert_eq!(dropped.yellow_blood, Some(true));
        assert!(world.marine(&vasquez).unwrap().inventory.is_empty());
    }

    #[test]
    fn drop_outside_shuttle_is_skipped() {
        let mut world = scenario().clone();
        world.marine_mut(&hudson()).unwrap().inventory.push("flare".to_owned());
        world.marine_mut(&hudson()).unwrap().position = CORRIDOR.to_owned();
        let before = world.clone();
        let event = Event::new(0, EventType::Interact, "hudson")
            .with_target("flare")
            .with_detail("action", "drop");
        assert!(apply(&mut world, &event).is_err());
        assert_eq!(world, before);
    }

    #[test]
    fn door_and_console_unlock() {
        let mut events = walk("hicks", &[SHUTTLE_BAY, CORRIDOR, COMMAND], 0);
        events.push(
            Event::new(3, EventType::Interact, "hicks")
                .with_target("door")
                .with_detail("zone", COMMAND),
        );
        events.push(
            Event::new(4, EventType::Interact, "hicks")
                .with_target("console")
                .with_detail("zone", COMMAND),
        );
        let world = derive_state(&events);
        let command = world.zones.get(COMMAND).unwrap();
        assert_eq!(command.door.as_ref().map(|d| d.state), Some(ItemStatus::Unlocked));
        assert_eq!(command.console.as_ref().map(|c| c.state), Some(ItemStatus::Unlocked));
    }

    #[test]
    fn heavy_damage_clamps_health_to_zero() {
        let events = vec![
            Event::new(0, EventType::Attack, ALIEN_ID)
                .with_target("hudson")
                .with_detail("damage", 12),
        ];
        let world = derive_state(&events);
        assert_eq!(world.marine(&hudson()).unwrap().health, 0);
    }

    #[test]
    fn missed_attack_on_marine_does_no_damage() {
        let events = vec![
            Event::new(0, EventType::Attack, ALIEN_ID)
                .with_target("hudson")
                .with_detail("hit", false)
                .with_detail("damage", 4),
        ];
        assert_eq!(derive_state(&events).marine(&hudson()).unwrap().health, 10);
    }

    #[test]
    fn hit_on_alien_reveals_without_moving() {
        let events = vec![
            Event::new(0, EventType::Attack, "hudson")
                .with_target(ALIEN_ID)
                .with_detail("hit", true),
        ];
        let world = derive_state(&events);
        assert!(!world.agents.alien.hidden);
        assert_eq!(world.agents.alien.position, VENTS);
    }

    #[test]
    fn missed_attack_on_alien_changes_nothing() {
        let events = vec![
            Event::new(0, EventType::Attack, "hudson")
                .with_target(ALIEN_ID)
                .with_detail("hit", false),
        ];
        assert_eq!(&derive_state(&events), scenario());
    }

    #[test]
    fn alien_events_from_other_actors_are_ignored() {
        let events = vec![Event::new(0, EventType::Hunt, "hudson").with_target(STORAGE)];
        assert_eq!(&derive_state(&events), scenario());
    }

    #[test]
    fn alien_cannot_be_moved_by_a_plain_move() {
        let events = vec![Event::new(0, EventType::Move, ALIEN_ID).with_target(STORAGE)];
        assert_eq!(derive_state(&events).agents.alien.position, VENTS);
    }

    #[test]
    fn hunt_reveals_and_hide_conceals() {
        let mut events = vec![Event::new(0, EventType::Hunt, ALIEN_ID).with_target(MEDBAY)];
        let world = derive_state(&events);
        assert_eq!(world.agents.alien.position, MEDBAY);
        assert!(!world.agents.alien.hidden);

        events.push(Event::new(1, EventType::Hide, ALIEN_ID));
        let world = derive_state(&events);
        assert_eq!(world.agents.alien.position, MEDBAY);
        assert!(world.agents.alien.hidden);
    }

    #[test]
    fn stalk_follows_the_target_marine() {
        let mut events = walk("hudson", &[SHUTTLE_BAY, CORRIDOR], 0);
        events.push(Event::new(2, EventType::Stalk, ALIEN_ID).with_target("hudson"));
        let world = derive_state(&events);
        assert_eq!(world.agents.alien.position, CORRIDOR);
        assert!(world.agents.alien.hidden);
    }

    #[test]
    fn lurk_only_shifts_to_adjacent_zones() {
        let far = vec![Event::new(0, EventType::Lurk, ALIEN_ID).with_detail("to", SHUTTLE)];
        assert_eq!(derive_state(&far).agents.alien.position, VENTS);

        let near = vec![Event::new(0, EventType::Lurk, ALIEN_ID).with_detail("to", STORAGE)];
        assert_eq!(derive_state(&near).agents.alien.position, STORAGE);
    }

    #[test]
    fn ambush_reveals_and_wounds() {
        let mut events = walk("hicks", &[SHUTTLE_BAY, CORRIDOR, STORAGE], 0);
        events.push(
            Event::new(3, EventType::Ambush, ALIEN_ID)
                .with_target("hicks")
                .with_detail("damage", 3),
        );
        let world = derive_state(&events);
        assert_eq!(world.agents.alien.position, STORAGE);
        assert!(!world.agents.alien.hidden);
        assert_eq!(world.marine(&AgentId::from("hicks")).unwrap().health, 7);
    }

    #[test]
    fn cover_and_escalate_raise_stress() {
        let events = vec![
            Event::new(0, EventType::Cover, "hudson"),
            Event::new(1, EventType::Escalate, DIRECTOR_ID),
        ];
        let world = derive_state(&events);
        let hudson = world.marine(&hudson()).unwrap();
        assert!((hudson.stress - 2.5).abs() < 1e-9);
        let hicks = world.marine(&AgentId::from("hicks")).unwrap();
        assert!((hicks.stress - 1.5).abs() < 1e-9);
        assert_eq!(world.agents.director.adjustments.len(), 1);
    }

    #[test]
    fn nudge_amount_is_clamped_or_tick_seeded() {
        let recorded = Event::new(0, EventType::Nudge, DIRECTOR_ID).with_detail("amount", 9.0);
        assert!((nudge_amount(&recorded) - NUDGE_MAX).abs() < 1e-9);

        let seeded = Event::new(17, EventType::Nudge, DIRECTOR_ID);
        let first = nudge_amount(&seeded);
        assert!((NUDGE_MIN..=NUDGE_MAX).contains(&first));
        assert!((first - nudge_amount(&seeded)).abs() < 1e-12);
    }

    #[test]
    fn nudge_without_target_hits_every_marine() {
        let events = vec![Event::new(0, EventType::Nudge, DIRECTOR_ID).with_detail("amount", 1.0)];
        let world = derive_state(&events);
        assert!(world.agents.marines.iter().all(|m| (m.stress - 1.0).abs() < 1e-9));
    }

    #[test]
    fn hazard_only_affects_marines_in_zone() {
        let mut events = walk("hudson", &[SHUTTLE_BAY], 0);
        events.push(Event::new(1, EventType::Hazard, DIRECTOR_ID).with_target(SHUTTLE_BAY));
        let world = derive_state(&events);
        assert!((world.marine(&hudson()).unwrap().stress - HAZARD_STRESS).abs() < 1e-9);
        assert!(world.marine(&AgentId::from("hicks")).unwrap().stress.abs() < 1e-9);
    }

    #[test]
    fn reveal_exposes_hidden_items() {
        let events = vec![Event::new(0, EventType::Reveal, DIRECTOR_ID).with_target(MEDBAY)];
        let world = derive_state(&events);
        let sample = world.zones.get(MEDBAY).unwrap().items.get(WIN_ITEM).unwrap();
        assert_eq!(sample.state, ItemStatus::Present);
    }

    #[test]
    fn isolate_relocks_the_door_and_stresses() {
        let mut events = walk("hicks", &[SHUTTLE_BAY, CORRIDOR, COMMAND], 0);
        events.push(
            Event::new(3, EventType::Interact, "hicks")
                .with_target("door")
                .with_detail("zone", COMMAND),
        );
        events.push(Event::new(4, EventType::Isolate, DIRECTOR_ID).with_target("hicks"));
        let world = derive_state(&events);
        let door = world.zones.get(COMMAND).unwrap().door.as_ref().unwrap();
        assert_eq!(door.state, ItemStatus::Locked);
        let hicks = world.marine(&AgentId::from("hicks")).unwrap();
        assert!((hicks.stress - ISOLATE_STRESS).abs() < 1e-9);
    }

    #[test]
    fn panic_forces_relocation() {
        let mut events = walk("hudson", &[SHUTTLE_BAY, CORRIDOR], 0);
        events.push(
            Event::new(2, EventType::Panic, DIRECTOR_ID)
                .with_target("hudson")
                .with_detail("to", MEDBAY),
        );
        let world = derive_state(&events);
        assert_eq!(world.marine(&hudson()).unwrap().position, MEDBAY);

        let fallback = vec![
            Event::new(0, EventType::Panic, DIRECTOR_ID)
                .with_target("hudson")
                .with_detail("to", VENTS),
        ];
        let world = derive_state(&fallback);
        assert_eq!(world.marine(&hudson()).unwrap().position, SHUTTLE_BAY);
    }

    #[test]
    fn unknown_and_malformed_events_do_not_stop_the_fold() {
        let events = vec![
            Event::new(0, EventType::Unknown, "hudson"),
            Event::new(1, EventType::Attack, ALIEN_ID).with_target("hudson"),
            Event::new(2, EventType::Search, "hudson"),
            Event::new(3, EventType::Move, "hudson").with_target(SHUTTLE_BAY),
        ];
        let world = derive_state(&events);
        let marine = world.marine(&hudson()).unwrap();
        assert_eq!(marine.position, SHUTTLE_BAY);
        assert_eq!(marine.health, 10);
    }

    #[test]
    fn director_events_from_marines_are_ignored() {
        let events = vec![Event::new(0, EventType::Escalate, "hudson")];
        assert_eq!(&derive_state(&events), scenario());
    }
}
