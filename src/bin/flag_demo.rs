//! Headless walk through the flag bridge: a crowded cell, an army and a
//! village, driven by notifications over a few frames.
//! Run with: cargo run --bin flag_demo

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;
use unit_flags::UnitFlagPlugin;
use unit_flags::bridge::{LocalObserver, UnitFlags};
use unit_flags::health::HealthSnapshot;
use unit_flags::ids::{ArmyId, IndependentId, PlayerId, UnitId, UnitTypeId};
use unit_flags::messages::FlagNotification;
use unit_flags::snapshot::{
    ArmySnapshot, CoreClass, FormationClass, PlayerSnapshot, Relationship, RevealState,
    SnapshotStore, UnitDefinition, UnitSnapshot,
};

const ROME: PlayerId = PlayerId(0);
const RAIDERS: PlayerId = PlayerId(10);
const RAIDER_FACTION: IndependentId = IndependentId(1);

const INFANTRY: UnitTypeId = UnitTypeId(1);
const SETTLER: UnitTypeId = UnitTypeId(2);
const GENERAL: UnitTypeId = UnitTypeId(3);

const LEGION: ArmyId = ArmyId(1);

fn main() {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()))
        .insert_resource(build_world())
        .insert_resource(LocalObserver(ROME))
        .add_plugins(UnitFlagPlugin::<SnapshotStore>::default())
        .add_systems(Startup, announce_units);

    // Frame 1 spawns every flag, frame 2 runs the deferred army refresh
    app.update();
    app.update();

    // Damage and a promotion arrive later
    let veteran = UnitId::new(ROME, 2);
    {
        let mut store = app.world_mut().resource_mut::<SnapshotStore>();
        store.set_health(veteran, 60, 100);
        store.set_experience_level(veteran, 2);
    }
    {
        let mut notifications = app
            .world_mut()
            .resource_mut::<Messages<FlagNotification>>();
        notifications.write(FlagNotification::UnitDamageChanged { unit: veteran });
        notifications.write(FlagNotification::UnitPromoted { unit: veteran });
    }
    app.update();
    app.update();

    log_flags(app.world().resource::<UnitFlags>());
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

fn unit(owner: PlayerId, local: u32, type_id: UnitTypeId, at: TilePos) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(owner, local),
        name: format!("Unit {}", local),
        type_id,
        location: at,
        health: Some(HealthSnapshot::new(0, 100)),
        is_commander: type_id == GENERAL,
        is_army_commander: false,
        can_attack: type_id == INFANTRY,
        army_id: None,
        experience_level: Some(0),
        movement_remaining: Some(1.0),
        is_on_map: true,
    }
}

fn build_world() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.set_default_reveal(RevealState::Visible);

    store.insert_definition(definition(
        INFANTRY,
        "Infantry",
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

    store.insert_player(PlayerSnapshot {
        id: ROME,
        name: "Rome".to_string(),
        primary_color: Color::srgb(0.6, 0.1, 0.1),
        secondary_color: Color::srgb(0.9, 0.8, 0.2),
        independent: None,
    });
    store.insert_player(PlayerSnapshot {
        id: RAIDERS,
        name: "Sea Raiders".to_string(),
        primary_color: Color::srgb(0.2, 0.2, 0.2),
        secondary_color: Color::srgb(0.7, 0.7, 0.7),
        independent: Some(RAIDER_FACTION),
    });
    store.set_independent_name(RAIDER_FACTION, "Raider Cove");
    store.set_relationship(RAIDER_FACTION, ROME, Relationship::Hostile);

    let crowded = TilePos { x: 4, y: 4 };
    for local in 1..=3 {
        store.insert_unit(unit(ROME, local, INFANTRY, crowded));
    }

    let camp = TilePos { x: 7, y: 2 };
    let mut general = unit(ROME, 10, GENERAL, camp);
    general.army_id = Some(LEGION);
    general.is_army_commander = true;
    store.insert_unit(general);
    store.insert_unit(unit(ROME, 11, INFANTRY, camp));
    store.insert_unit(unit(ROME, 12, SETTLER, camp));
    store.insert_army(ArmySnapshot {
        id: LEGION,
        member_ids: vec![
            UnitId::new(ROME, 10),
            UnitId::new(ROME, 11),
            UnitId::new(ROME, 12),
        ],
        unit_count: 3,
        combat_unit_capacity: 4,
    });

    store.insert_unit(unit(RAIDERS, 1, INFANTRY, TilePos { x: 12, y: 9 }));
    store
}

fn announce_units(mut notifications: MessageWriter<FlagNotification>) {
    let units = [
        UnitId::new(ROME, 1),
        UnitId::new(ROME, 2),
        UnitId::new(ROME, 3),
        UnitId::new(ROME, 10),
        UnitId::new(ROME, 11),
        UnitId::new(ROME, 12),
        UnitId::new(RAIDERS, 1),
    ];
    for unit in units {
        notifications.write(FlagNotification::UnitAddedToMap { unit });
    }
    notifications.write(FlagNotification::UnitAddedToArmy {
        initiating_unit: UnitId::new(ROME, 12),
        army: LEGION,
    });
}

fn log_flags(flags: &UnitFlags) {
    let mut live: Vec<_> = flags.tracker().iter().collect();
    live.sort_by_key(|flag| flag.unit_id());

    info!("{} unit flags for player {}", live.len(), flags.viewer());
    for flag in live {
        let Some(skin) = flag.skin() else {
            warn!("Flag {} has no skin", flag.unit_id());
            continue;
        };
        info!(
            "{} [{}] stack {} ({}px) health {:?} {:.0}% badge {:?} army {:?} affinity {:?}",
            flag.unit_id(),
            flag.kind().type_name(),
            flag.stack_offset(),
            skin.top_px,
            skin.health.band,
            skin.health.fill_percent,
            skin.promotion_badge,
            skin.army_stats,
            skin.affinity,
        );
    }
}
