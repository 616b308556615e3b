//! The static starting configuration: a derelict station with seven zones.
//!
//! The squad lands in the `Shuttle`. The creature hides in the `Vents`,
//! which connect to three rooms off the central `Corridor`. The blood sample
//! in the `Medbay` is the item the squad must bring back to the shuttle.
//!
//! The template is built once and shared. Derivation always clones it, so
//! nothing can mutate the shared copy.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use squad_types::{
    AgentId, Agents, Alien, Director, ItemState, ItemStatus, Marine, MAX_HEALTH, Personality,
    WorldSnapshot, Zone,
};

/// Landing zone; the only place cargo can be dropped.
pub const SHUTTLE: &str = "Shuttle";
/// Airlock between the shuttle and the station.
pub const SHUTTLE_BAY: &str = "Shuttle Bay";
/// Central hub of the station.
pub const CORRIDOR: &str = "Corridor";
/// Supply room with the cabinet.
pub const STORAGE: &str = "Storage";
/// Bridge with the locked door and console.
pub const COMMAND: &str = "Command";
/// Medical bay holding the sample.
pub const MEDBAY: &str = "Medbay";
/// Crawlspace the creature uses to move between rooms.
pub const VENTS: &str = "Vents";

/// The win-condition item.
pub const WIN_ITEM: &str = "sample";

/// Callsign of the creature.
pub const ALIEN_ID: &str = "alien";
/// Callsign of the director.
pub const DIRECTOR_ID: &str = "director";

static SCENARIO: LazyLock<WorldSnapshot> = LazyLock::new(build_scenario);

/// The shared starting snapshot.
pub fn scenario() -> &'static WorldSnapshot {
    &SCENARIO
}

fn zone(connections: &[&str], items: Vec<(&str, ItemState)>) -> Zone {
    Zone {
        connections: connections.iter().map(|c| (*c).to_owned()).collect(),
        items: items
            .into_iter()
            .map(|(name, state)| (name.to_owned(), state))
            .collect(),
        door: None,
        console: None,
    }
}

fn marine(id: &str, personality: Personality, compliance: f64) -> Marine {
    Marine {
        id: AgentId::from(id),
        personality,
        compliance,
        position: SHUTTLE.to_owned(),
        health: MAX_HEALTH,
        stress: 0.0,
        inventory: Vec::new(),
    }
}

fn build_scenario() -> WorldSnapshot {
    let mut zones = BTreeMap::new();

    zones.insert(SHUTTLE.to_owned(), zone(&[SHUTTLE_BAY], Vec::new()));
    zones.insert(SHUTTLE_BAY.to_owned(), zone(&[SHUTTLE, CORRIDOR], Vec::new()));
    zones.insert(
        CORRIDOR.to_owned(),
        zone(&[SHUTTLE_BAY, STORAGE, COMMAND, MEDBAY], Vec::new()),
    );
    zones.insert(
        STORAGE.to_owned(),
        zone(
            &[CORRIDOR, VENTS],
            vec![
                ("cabinet", ItemState::container(&["medkit", "ammo"])),
                ("flare", ItemState::new(ItemStatus::Present)),
            ],
        ),
    );

    let mut command = zone(&[CORRIDOR, VENTS], Vec::new());
    command.door = Some(ItemState::new(ItemStatus::Locked));
    command.console = Some(ItemState::new(ItemStatus::Locked));
    zones.insert(COMMAND.to_owned(), command);

    let mut sample = ItemState::new(ItemStatus::Hidden);
    sample.yellow_blood = Some(true);
    zones.insert(
        MEDBAY.to_owned(),
        zone(
            &[CORRIDOR, VENTS],
            vec![
                (WIN_ITEM, sample),
                ("scanner", ItemState::new(ItemStatus::Present)),
            ],
        ),
    );
    zones.insert(VENTS.to_owned(), zone(&[STORAGE, MEDBAY, COMMAND], Vec::new()));

    WorldSnapshot {
        zones,
        agents: Agents {
            marines: vec![
                marine("hudson", Personality::Aggressive, 0.6),
                marine("hicks", Personality::Cautious, 0.85),
                marine("vasquez", Personality::Aggressive, 0.5),
            ],
            alien: Alien {
                id: AgentId::from(ALIEN_ID),
                position: VENTS.to_owned(),
                hidden: true,
                inventory: Vec::new(),
            },
            director: Director {
                id: AgentId::from(DIRECTOR_ID),
                adjustments: Vec::new(),
                inventory: Vec::new(),
            },
        },
    }
}
