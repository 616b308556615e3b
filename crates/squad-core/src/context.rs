//! Decision request assembly.
//!
//! Builds the bounded view each agent gets before deciding: its own state,
//! what it can see from where it stands, a window of recent events, and
//! (for marines and the director) the commander's standing order.

use squad_types::{
    AgentId, AgentKind, DecisionRequest, Event, ItemStatus, VisibleEntity, WorldSnapshot,
};

/// Build the request for one agent, or `None` if the id is not on the map.
///
/// `recent` should already be bounded to the configured window; it is
/// passed through unchanged.
pub fn build_request(
    world: &WorldSnapshot,
    agent: &AgentId,
    recent: &[Event],
    order: Option<&str>,
) -> Option<DecisionRequest> {
    let kind = world.kind_of(agent)?;
    let marine = world.marine(agent);
    let visible_entities = match kind {
        AgentKind::Marine => marine.map(|m| marine_view(world, agent, &m.position)),
        AgentKind::Alien => Some(alien_view(world)),
        AgentKind::Director => Some(director_view(world)),
    }
    .unwrap_or_default();

    Some(DecisionRequest {
        agent_id: agent.clone(),
        agent_kind: kind,
        personality: marine.map(|m| m.personality),
        stress: marine.map_or(0.0, |m| m.stress),
        position: world.position_of(agent).map(str::to_owned),
        visible_entities,
        recent_events: recent.to_vec(),
        commander_order: (kind != AgentKind::Alien)
            .then(|| order.map(str::to_owned))
            .flatten(),
        permitted_actions: kind
            .permitted_actions()
            .iter()
            .map(|a| a.as_str().to_owned())
            .collect(),
    })
}

fn entity(name: &str, kind: &str, zone: &str, status: impl Into<String>) -> VisibleEntity {
    VisibleEntity {
        name: name.to_owned(),
        kind: kind.to_owned(),
        zone: zone.to_owned(),
        status: status.into(),
    }
}

fn exits(world: &WorldSnapshot, zone: &str, into: &mut Vec<VisibleEntity>) {
    if let Some(z) = world.zones.get(zone) {
        into.extend(z.connections.iter().map(|c| entity(c, "exit", zone, "open")));
    }
}

/// Items, fixtures and people in the marine's zone, plus the exits.
fn marine_view(world: &WorldSnapshot, me: &AgentId, zone: &str) -> Vec<VisibleEntity> {
    let mut seen = Vec::new();
    if let Some(z) = world.zones.get(zone) {
        for (name, item) in &z.items {
            if item.state != ItemStatus::Hidden && item.carried_by.is_none() {
                seen.push(entity(name, "item", zone, item.state.to_string()));
            }
        }
        if let Some(door) = &z.door {
            seen.push(entity("door", "fixture", zone, door.state.to_string()));
        }
        if let Some(console) = &z.console {
            seen.push(entity("console", "fixture", zone, console.state.to_string()));
        }
    }
    for other in world.agents.marines.iter().filter(|m| m.position == zone && m.id != *me) {
        seen.push(entity(
            other.id.as_str(),
            "marine",
            zone,
            format!("health {}/10", other.health),
        ));
    }
    let alien = &world.agents.alien;
    if alien.position == zone && !alien.hidden {
        seen.push(entity(alien.id.as_str(), "alien", zone, "exposed"));
    }
    exits(world, zone, &mut seen);
    seen
}

/// Living marines in the alien's zone and the zones next to it.
fn alien_view(world: &WorldSnapshot) -> Vec<VisibleEntity> {
    let here = world.agents.alien.position.as_str();
    let near = |zone: &str| {
        zone == here || world.zones.get(here).is_some_and(|z| z.connects_to(zone))
    };
    let mut seen: Vec<VisibleEntity> = world
        .agents
        .marines
        .iter()
        .filter(|m| m.is_alive() && near(&m.position))
        .map(|m| entity(m.id.as_str(), "marine", &m.position, format!("stress {:.1}", m.stress)))
        .collect();
    exits(world, here, &mut seen);
    seen
}

/// Every marine and every zone.
fn director_view(world: &WorldSnapshot) -> Vec<VisibleEntity> {
    let mut seen: Vec<VisibleEntity> = world
        .agents
        .marines
        .iter()
        .map(|m| {
            entity(
                m.id.as_str(),
                "marine",
                &m.position,
                format!("health {}/10, stress {:.1}", m.health, m.stress),
            )
        })
        .collect();
    seen.extend(world.zones.keys().map(|z| entity(z, "zone", z, "")));
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use squad_types::{EventType, Personality};
    use squad_world::derive_state;
    use squad_world::scenario::{ALIEN_ID, DIRECTOR_ID, STORAGE};

    use super::*;

    #[test]
    fn marine_sees_zone_contents_and_exits() {
        let world = derive_state(&[
            Event::new(0, EventType::Move, "hicks").with_target(STORAGE),
            Event::new(1, EventType::Move, "hudson").with_target(STORAGE),
        ]);
        let request = build_request(&world, &AgentId::from("hicks"), &[], Some("search")).unwrap();
        assert_eq!(request.agent_kind, AgentKind::Marine);
        assert_eq!(request.personality, Some(Personality::Cautious));
        assert_eq!(request.position.as_deref(), Some(STORAGE));
        assert_eq!(request.commander_order.as_deref(), Some("search"));
        let names: Vec<&str> = request.visible_entities.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"cabinet"));
        assert!(names.contains(&"hudson"));
        assert!(names.contains(&"Vents"));
        assert!(!names.contains(&"hicks"));
        assert!(!names.contains(&ALIEN_ID), "the alien is hidden in the vents");
    }

    #[test]
    fn alien_never_hears_the_order() {
        let world = squad_world::scenario().clone();
        let request =
            build_request(&world, &AgentId::from(ALIEN_ID), &[], Some("kill it")).unwrap();
        assert_eq!(request.commander_order, None);
        assert!(request.permitted_actions.iter().any(|a| a == "sneak"));
        assert!(
            request.visible_entities.iter().all(|e| e.kind != "marine"),
            "marines start far from the vents"
        );
    }

    #[test]
    fn director_sees_everyone() {
        let world = squad_world::scenario().clone();
        let request = build_request(&world, &AgentId::from(DIRECTOR_ID), &[], None).unwrap();
        let marines = request.visible_entities.iter().filter(|e| e.kind == "marine").count();
        assert_eq!(marines, 3);
        assert_eq!(request.position, None);
    }

    #[test]
    fn recent_events_pass_through() {
        let events = vec![Event::new(0, EventType::Cover, "hudson")];
        let world = derive_state(&events);
        let request = build_request(&world, &AgentId::from("vasquez"), &events, None).unwrap();
        assert_eq!(request.recent_events, events);
    }

    #[test]
    fn unknown_agent_has_no_request() {
        let world = squad_world::scenario().clone();
        assert!(build_request(&world, &AgentId::from("bishop"), &[], None).is_none());
    }
}
