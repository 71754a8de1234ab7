use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;
use unit_flags::UnitFlagPlugin;
use unit_flags::bridge::LocalObserver;
use unit_flags::health::HealthSnapshot;
use unit_flags::ids::{ArmyId, IndependentId, PlayerId, UnitId, UnitTypeId};
use unit_flags::messages::FlagNotification;
use unit_flags::snapshot::{
    CoreClass, FormationClass, PlayerSnapshot, RevealState, SnapshotStore, UnitDefinition,
    UnitSnapshot,
};

pub const PLAYER: PlayerId = PlayerId(0);
pub const RIVAL: PlayerId = PlayerId(1);
pub const VILLAGE_PLAYER: PlayerId = PlayerId(10);
pub const VILLAGE: IndependentId = IndependentId(3);

pub const WARRIOR: UnitTypeId = UnitTypeId(1);
pub const SETTLER: UnitTypeId = UnitTypeId(2);
pub const GENERAL: UnitTypeId = UnitTypeId(3);

pub fn tile(x: u32, y: u32) -> TilePos {
    TilePos { x, y }
}

fn definition(
    type_id: UnitTypeId,
    name: &str,
    core_class: CoreClass,
    formation_class: FormationClass,
) -> UnitDefinition {
    UnitDefinition {
        type_id,
        name: name.to_string(),
        core_class,
        formation_class,
        can_earn_experience: formation_class != FormationClass::Civilian,
        tier: Some(1),
        icon: format!("fs://game/unit_{}.png", name.to_lowercase()),
    }
}

fn player(id: PlayerId, name: &str, independent: Option<IndependentId>) -> PlayerSnapshot {
    PlayerSnapshot {
        id,
        name: name.to_string(),
        primary_color: Color::srgb(0.8, 0.1, 0.1),
        secondary_color: Color::WHITE,
        independent,
    }
}

pub fn create_store() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.set_default_reveal(RevealState::Visible);
    store.insert_definition(definition(
        WARRIOR,
        "Warrior",
        CoreClass::Military,
        FormationClass::Combat,
    ));
    store.insert_definition(definition(
        SETTLER,
        "Settler",
        CoreClass::Civilian,
        FormationClass::Civilian,
    ));
    store.insert_definition(definition(
        GENERAL,
        "General",
        CoreClass::Military,
        FormationClass::Command,
    ));
    store.insert_player(player(PLAYER, "Rome", None));
    store.insert_player(player(RIVAL, "Carthage", None));
    store.insert_player(player(VILLAGE_PLAYER, "Sea Raiders", Some(VILLAGE)));
    store
}

pub fn unit(owner: PlayerId, local: u32, type_id: UnitTypeId, at: TilePos) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(owner, local),
        name: format!("Unit {}", local),
        type_id,
        location: at,
        health: Some(HealthSnapshot::new(0, 100)),
        is_commander: type_id == GENERAL,
        is_army_commander: false,
        can_attack: type_id == WARRIOR,
        army_id: None,
        experience_level: Some(0),
        movement_remaining: Some(2.0),
        is_on_map: true,
    }
}

pub fn commander(owner: PlayerId, local: u32, at: TilePos, army: ArmyId) -> UnitSnapshot {
    UnitSnapshot {
        is_army_commander: true,
        army_id: Some(army),
        ..unit(owner, local, GENERAL, at)
    }
}

/// Headless app running the flag plugin over `store`, viewed by [`PLAYER`].
pub fn create_app(store: SnapshotStore) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(store)
        .insert_resource(LocalObserver(PLAYER))
        .add_plugins(UnitFlagPlugin::<SnapshotStore>::default());
    app
}

pub fn notify(app: &mut App, notification: FlagNotification) {
    app.world_mut()
        .resource_mut::<Messages<FlagNotification>>()
        .write(notification);
}

pub fn store_mut(app: &mut App) -> Mut<'_, SnapshotStore> {
    app.world_mut().resource_mut::<SnapshotStore>()
}
