use super::*;
use crate::test_utils::*;

#[test]
fn occupants_keep_arrival_order() {
    let mut store = create_test_store();
    let cell = tile(2, 2);
    store.insert_unit(warrior(PLAYER, 1, cell));
    store.insert_unit(warrior(PLAYER, 2, cell));
    store.insert_unit(warrior(RIVAL, 3, cell));

    assert_eq!(
        store.occupants(cell),
        vec![
            UnitId::new(PLAYER, 1),
            UnitId::new(PLAYER, 2),
            UnitId::new(RIVAL, 3)
        ]
    );
}

#[test]
fn removing_a_unit_keeps_relative_order() {
    let mut store = create_test_store();
    let cell = tile(0, 0);
    store.insert_unit(warrior(PLAYER, 1, cell));
    store.insert_unit(warrior(PLAYER, 2, cell));
    store.insert_unit(warrior(PLAYER, 3, cell));

    assert!(store.remove_unit(UnitId::new(PLAYER, 2)).is_some());
    assert_eq!(
        store.occupants(cell),
        vec![UnitId::new(PLAYER, 1), UnitId::new(PLAYER, 3)]
    );
    assert!(store.unit(UnitId::new(PLAYER, 2)).is_none());
}

#[test]
fn moving_a_unit_updates_both_cells() {
    let mut store = create_test_store();
    let from = tile(0, 0);
    let to = tile(1, 0);
    let id = UnitId::new(PLAYER, 1);
    store.insert_unit(warrior(PLAYER, 1, from));
    store.insert_unit(warrior(PLAYER, 2, to));

    assert!(store.move_unit(id, to));
    assert!(store.occupants(from).is_empty());
    assert_eq!(store.occupants(to), vec![UnitId::new(PLAYER, 2), id]);
    assert_eq!(store.unit(id).map(|u| u.location), Some(to));

    assert!(!store.move_unit(UnitId::new(RIVAL, 99), to));
}

#[test]
fn independent_lookups_follow_plot_owner() {
    let mut store = create_test_store();
    let village_plot = tile(5, 5);
    let rival_plot = tile(6, 6);
    store.set_plot_owner(village_plot, VILLAGE_PLAYER);
    store.set_plot_owner(rival_plot, RIVAL);

    assert_eq!(store.independent_at(village_plot), VILLAGE);
    assert_eq!(store.independent_at(rival_plot), IndependentId::NONE);
    assert_eq!(store.independent_at(tile(9, 9)), IndependentId::NONE);
    assert_eq!(store.plot_owner(tile(9, 9)), PlayerId::NONE);
    assert_eq!(
        store.independent_of_unit(UnitId::new(VILLAGE_PLAYER, 1)),
        VILLAGE
    );
}

#[test]
fn unknown_relationship_is_not_applicable() {
    let mut store = create_test_store();
    assert_eq!(
        store.relationship(VILLAGE, PLAYER),
        Relationship::NotApplicable
    );
    store.set_relationship(VILLAGE, PLAYER, Relationship::Hostile);
    assert_eq!(store.relationship(VILLAGE, PLAYER), Relationship::Hostile);
}

#[test]
fn reveal_state_falls_back_to_default() {
    let mut store = create_test_store();
    let cell = tile(3, 1);
    assert_eq!(store.reveal_state(PLAYER, cell), RevealState::Visible);
    store.set_reveal_state(PLAYER, cell, RevealState::Revealed);
    assert_eq!(store.reveal_state(PLAYER, cell), RevealState::Revealed);
    assert_eq!(store.reveal_state(RIVAL, cell), RevealState::Visible);
}
