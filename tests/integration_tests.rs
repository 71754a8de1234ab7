//! Integration tests for the unit flag plugin
//!
//! These drive the plugin through messages on a headless app, the way a host
//! game would.

mod common;

use bevy::prelude::*;
use common::*;
use unit_flags::bridge::{DeferredRefresh, LocalObserver, SelectedUnit, UnitFlags};
use unit_flags::flags::FlagKind;
use unit_flags::ids::{ArmyId, UnitId};
use unit_flags::messages::{
    FlagActivated, FlagInput, FlagNotification, InputAction, InputPhase, UnhandledFlagInput,
};
use unit_flags::snapshot::ArmySnapshot;

fn flags(app: &App) -> &UnitFlags {
    app.world().resource::<UnitFlags>()
}

fn tap(unit: UnitId) -> FlagInput {
    FlagInput {
        unit,
        action: InputAction::MouseButtonLeft,
        phase: InputPhase::Finish,
        x: 100.0,
        y: 50.0,
    }
}

#[test]
fn test_units_added_to_map_get_stacked_flags() {
    let mut store = create_store();
    let ids: Vec<UnitId> = (1..=3)
        .map(|local| {
            let warrior = unit(PLAYER, local, WARRIOR, tile(2, 2));
            let id = warrior.id;
            store.insert_unit(warrior);
            id
        })
        .collect();
    let mut app = create_app(store);

    for unit in &ids {
        notify(&mut app, FlagNotification::UnitAddedToMap { unit: *unit });
    }
    app.update();

    let flags = flags(&app);
    assert_eq!(flags.len(), 3);
    let offsets: Vec<u32> = ids
        .iter()
        .map(|unit| flags.flag(*unit).unwrap().stack_offset())
        .collect();
    assert_eq!(offsets, vec![0, 1, 2]);
    assert_eq!(flags.viewer(), PLAYER);
}

#[test]
fn test_removed_units_free_their_slot() {
    let mut store = create_store();
    for local in 1..=3 {
        store.insert_unit(unit(PLAYER, local, WARRIOR, tile(2, 2)));
    }
    let mut app = create_app(store);
    let [a, b, c] = [1, 2, 3].map(|local| UnitId::new(PLAYER, local));
    for unit in [a, b, c] {
        notify(&mut app, FlagNotification::UnitAddedToMap { unit });
    }
    app.update();

    store_mut(&mut app).remove_unit(b);
    notify(&mut app, FlagNotification::UnitRemovedFromMap { unit: b });
    app.update();

    let flags = flags(&app);
    assert!(flags.flag(b).is_none());
    assert_eq!(flags.flag(a).unwrap().stack_offset(), 0);
    assert_eq!(flags.flag(c).unwrap().stack_offset(), 1);
}

#[test]
fn test_army_refresh_runs_on_the_next_frame() {
    let army = ArmyId(4);
    let mut store = create_store();
    let general = commander(PLAYER, 1, tile(6, 6), army);
    let general_id = general.id;
    store.insert_unit(general);
    store.insert_army(ArmySnapshot {
        id: army,
        member_ids: vec![general_id],
        unit_count: 1,
        combat_unit_capacity: 4,
    });
    let mut app = create_app(store);
    notify(&mut app, FlagNotification::UnitAddedToMap { unit: general_id });
    app.update();
    assert_eq!(
        flags(&app).flag(general_id).unwrap().kind(),
        FlagKind::ArmyCommander
    );

    let recruit = unit(PLAYER, 2, SETTLER, tile(6, 6));
    let recruit_id = recruit.id;
    {
        let mut store = store_mut(&mut app);
        store.insert_unit(recruit);
        store.insert_army(ArmySnapshot {
            id: army,
            member_ids: vec![general_id, recruit_id],
            unit_count: 2,
            combat_unit_capacity: 4,
        });
    }
    notify(
        &mut app,
        FlagNotification::UnitAddedToArmy {
            initiating_unit: recruit_id,
            army,
        },
    );
    app.update();

    let skin = flags(&app).flag(general_id).unwrap().skin().unwrap();
    assert_eq!(skin.army_stats.as_deref(), Some("0|4"));
    assert!(
        flags(&app)
            .deferred()
            .is_pending(general_id, DeferredRefresh::Army)
    );

    app.update();

    let skin = flags(&app).flag(general_id).unwrap().skin().unwrap();
    assert_eq!(skin.army_stats.as_deref(), Some("0|4 + 1"));
    assert_eq!(skin.stack_layers.len(), 2);
}

#[test]
fn test_promotion_then_removal_in_one_frame() {
    let mut store = create_store();
    let warrior = unit(PLAYER, 1, WARRIOR, tile(0, 0));
    let id = warrior.id;
    store.insert_unit(warrior);
    let mut app = create_app(store);
    notify(&mut app, FlagNotification::UnitAddedToMap { unit: id });
    app.update();

    store_mut(&mut app).set_experience_level(id, 3);
    notify(&mut app, FlagNotification::UnitPromoted { unit: id });
    store_mut(&mut app).remove_unit(id);
    notify(&mut app, FlagNotification::UnitRemovedFromMap { unit: id });
    app.update();
    app.update();

    assert!(flags(&app).is_empty());
    assert!(flags(&app).deferred().is_empty());
}

#[test]
fn test_flag_input_selects_own_units_only() {
    let mut store = create_store();
    let own = unit(PLAYER, 1, WARRIOR, tile(0, 0));
    let theirs = unit(RIVAL, 1, WARRIOR, tile(1, 0));
    let (own_id, their_id) = (own.id, theirs.id);
    store.insert_unit(own);
    store.insert_unit(theirs);
    let mut app = create_app(store);
    notify(&mut app, FlagNotification::UnitAddedToMap { unit: own_id });
    notify(&mut app, FlagNotification::UnitAddedToMap { unit: their_id });
    app.update();

    {
        let mut inputs = app.world_mut().resource_mut::<Messages<FlagInput>>();
        inputs.write(tap(own_id));
        inputs.write(tap(their_id));
    }
    app.update();

    assert_eq!(app.world().resource::<SelectedUnit>().0, Some(own_id));
    let activated: Vec<FlagActivated> = app
        .world_mut()
        .resource_mut::<Messages<FlagActivated>>()
        .drain()
        .collect();
    assert_eq!(
        activated,
        vec![FlagActivated {
            unit: own_id,
            x: 100.0,
            y: 50.0
        }]
    );
    let unhandled: Vec<UnhandledFlagInput> = app
        .world_mut()
        .resource_mut::<Messages<UnhandledFlagInput>>()
        .drain()
        .collect();
    assert_eq!(unhandled, vec![UnhandledFlagInput(tap(their_id))]);
}

#[test]
fn test_observer_change_redraws_flags() {
    let mut store = create_store();
    let warrior = unit(PLAYER, 1, WARRIOR, tile(0, 0));
    let id = warrior.id;
    store.insert_unit(warrior);
    let mut app = create_app(store);
    notify(&mut app, FlagNotification::UnitAddedToMap { unit: id });
    app.update();
    assert!(flags(&app).flag(id).unwrap().skin().unwrap().highlight);

    app.world_mut().insert_resource(LocalObserver(RIVAL));
    app.update();

    assert_eq!(flags(&app).viewer(), RIVAL);
    assert!(!flags(&app).flag(id).unwrap().skin().unwrap().highlight);
}

#[test]
fn test_village_flags_follow_diplomacy() {
    use unit_flags::snapshot::Relationship;

    let mut store = create_store();
    let raider = unit(VILLAGE_PLAYER, 1, WARRIOR, tile(3, 3));
    let id = raider.id;
    store.insert_unit(raider);
    store.set_relationship(VILLAGE, PLAYER, Relationship::Hostile);
    store.set_plot_owner(tile(3, 3), VILLAGE_PLAYER);
    let mut app = create_app(store);
    notify(&mut app, FlagNotification::UnitAddedToMap { unit: id });
    app.update();
    assert_eq!(
        flags(&app).flag(id).unwrap().skin().unwrap().affinity,
        Some(Relationship::Hostile)
    );

    store_mut(&mut app).set_relationship(VILLAGE, PLAYER, Relationship::Friendly);
    notify(
        &mut app,
        FlagNotification::DiplomacyEventEnded {
            location: Some(tile(3, 3)),
        },
    );
    app.update();

    assert_eq!(
        flags(&app).flag(id).unwrap().skin().unwrap().affinity,
        Some(Relationship::Friendly)
    );
}

#[test]
fn test_before_unload_clears_the_session() {
    let mut store = create_store();
    store.insert_unit(unit(PLAYER, 1, WARRIOR, tile(0, 0)));
    let mut app = create_app(store);
    notify(
        &mut app,
        FlagNotification::UnitAddedToMap {
            unit: UnitId::new(PLAYER, 1),
        },
    );
    app.update();
    assert_eq!(flags(&app).len(), 1);

    notify(&mut app, FlagNotification::BeforeUnload);
    app.update();
    assert!(flags(&app).is_empty());
}
