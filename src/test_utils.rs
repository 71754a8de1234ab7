//! Testing utilities for the unit flags
//!
//! Fixtures for a small game: two major players, one independent power and a
//! handful of unit types, mirrored into a [`SnapshotStore`].

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::bridge::UnitFlags;
use crate::flags::FlagRegistry;
use crate::health::HealthSnapshot;
use crate::ids::{ArmyId, IndependentId, PlayerId, UnitId, UnitTypeId};
use crate::settings::FlagSettings;
use crate::snapshot::{
    CoreClass, FormationClass, PlayerSnapshot, RevealState, SnapshotStore, UnitDefinition,
    UnitSnapshot,
};

pub const PLAYER: PlayerId = PlayerId(0);
pub const RIVAL: PlayerId = PlayerId(1);
pub const VILLAGE_PLAYER: PlayerId = PlayerId(10);
pub const VILLAGE: IndependentId = IndependentId(3);
pub const OTHER_VILLAGE_PLAYER: PlayerId = PlayerId(11);
pub const OTHER_VILLAGE: IndependentId = IndependentId(4);

pub const WARRIOR: UnitTypeId = UnitTypeId(1);
pub const SETTLER: UnitTypeId = UnitTypeId(2);
pub const GENERAL: UnitTypeId = UnitTypeId(3);
pub const SCOUT: UnitTypeId = UnitTypeId(4);
pub const MERCHANT: UnitTypeId = UnitTypeId(5);

pub const PLAYER_PRIMARY: Color = Color::srgb(0.8, 0.1, 0.1);
pub const PLAYER_SECONDARY: Color = Color::srgb(1.0, 0.9, 0.2);

pub fn tile(x: u32, y: u32) -> TilePos {
    TilePos { x, y }
}

fn definition(
    type_id: UnitTypeId,
    name: &str,
    core_class: CoreClass,
    formation_class: FormationClass,
    can_earn_experience: bool,
) -> UnitDefinition {
    UnitDefinition {
        type_id,
        name: name.to_string(),
        core_class,
        formation_class,
        can_earn_experience,
        tier: Some(1),
        icon: format!("fs://game/unit_{}.png", name.to_lowercase()),
    }
}

fn player(id: PlayerId, name: &str, independent: Option<IndependentId>) -> PlayerSnapshot {
    PlayerSnapshot {
        id,
        name: name.to_string(),
        primary_color: PLAYER_PRIMARY,
        secondary_color: PLAYER_SECONDARY,
        independent,
    }
}

/// Store with definitions and players registered and every cell visible.
pub fn create_test_store() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.set_default_reveal(RevealState::Visible);

    store.insert_definition(definition(
        WARRIOR,
        "Warrior",
        CoreClass::Military,
        FormationClass::Combat,
        true,
    ));
    store.insert_definition(definition(
        SETTLER,
        "Settler",
        CoreClass::Civilian,
        FormationClass::Civilian,
        false,
    ));
    store.insert_definition(definition(
        GENERAL,
        "General",
        CoreClass::Military,
        FormationClass::Command,
        true,
    ));
    store.insert_definition(definition(
        SCOUT,
        "Scout",
        CoreClass::Recon,
        FormationClass::Support,
        true,
    ));
    store.insert_definition(definition(
        MERCHANT,
        "Merchant",
        CoreClass::Support,
        FormationClass::Civilian,
        false,
    ));

    store.insert_player(player(PLAYER, "Rome", None));
    store.insert_player(player(RIVAL, "Carthage", None));
    store.insert_player(player(VILLAGE_PLAYER, "Sea Raiders", Some(VILLAGE)));
    store.insert_player(player(OTHER_VILLAGE_PLAYER, "Hill Clans", Some(OTHER_VILLAGE)));

    store
}

/// An undamaged unit standing on the map.
pub fn unit(owner: PlayerId, local: u32, type_id: UnitTypeId, at: TilePos) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(owner, local),
        name: format!("Unit {}", local),
        type_id,
        location: at,
        health: Some(HealthSnapshot::new(0, 100)),
        is_commander: false,
        is_army_commander: false,
        can_attack: type_id == WARRIOR,
        army_id: None,
        experience_level: Some(0),
        movement_remaining: Some(2.0),
        is_on_map: true,
    }
}

pub fn warrior(owner: PlayerId, local: u32, at: TilePos) -> UnitSnapshot {
    unit(owner, local, WARRIOR, at)
}

pub fn commander(owner: PlayerId, local: u32, at: TilePos, army: Option<ArmyId>) -> UnitSnapshot {
    UnitSnapshot {
        is_commander: true,
        is_army_commander: army.is_some(),
        army_id: army,
        ..unit(owner, local, GENERAL, at)
    }
}

/// Flag session for the local player with the default makers registered.
pub fn create_test_flags() -> UnitFlags {
    let mut flags = UnitFlags::new(FlagRegistry::with_default_makers(), FlagSettings::default());
    flags.set_viewer(PLAYER);
    flags
}
