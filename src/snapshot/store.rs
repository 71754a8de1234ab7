use std::collections::HashMap;

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use super::{
    ArmySnapshot, PlayerSnapshot, Relationship, RevealState, UnitDefinition, UnitSnapshot,
    UnitSnapshots,
};
use crate::health::HealthSnapshot;
use crate::ids::{ArmyId, IndependentId, PlayerId, UnitId, UnitTypeId};

/// In-memory [`UnitSnapshots`] provider.
///
/// The host mirrors simulation state into this resource before sending the
/// matching [`crate::messages::FlagNotification`]. Occupant lists keep arrival
/// order, which is the stacking order the flags use.
#[derive(Resource, Default, Debug, Clone)]
pub struct SnapshotStore {
    units: HashMap<UnitId, UnitSnapshot>,
    definitions: HashMap<UnitTypeId, UnitDefinition>,
    armies: HashMap<ArmyId, ArmySnapshot>,
    players: HashMap<PlayerId, PlayerSnapshot>,
    cells: HashMap<TilePos, Vec<UnitId>>,
    plot_owners: HashMap<TilePos, PlayerId>,
    relationships: HashMap<(IndependentId, PlayerId), Relationship>,
    independent_names: HashMap<IndependentId, String>,
    reveal: HashMap<(PlayerId, TilePos), RevealState>,
    default_reveal: RevealState,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_definition(&mut self, definition: UnitDefinition) {
        self.definitions.insert(definition.type_id, definition);
    }

    pub fn insert_player(&mut self, player: PlayerSnapshot) {
        self.players.insert(player.id, player);
    }

    pub fn set_independent_name(&mut self, independent: IndependentId, name: impl Into<String>) {
        self.independent_names.insert(independent, name.into());
    }

    /// Adds or replaces a unit. Units on the map join the end of their cell.
    pub fn insert_unit(&mut self, unit: UnitSnapshot) {
        self.remove_unit(unit.id);
        if unit.is_on_map {
            self.cells.entry(unit.location).or_default().push(unit.id);
        }
        self.units.insert(unit.id, unit);
    }

    pub fn remove_unit(&mut self, id: UnitId) -> Option<UnitSnapshot> {
        let unit = self.units.remove(&id)?;
        self.leave_cell(id, unit.location);
        Some(unit)
    }

    /// Moves a unit to the end of the occupant list of `to`.
    pub fn move_unit(&mut self, id: UnitId, to: TilePos) -> bool {
        let Some(from) = self.units.get(&id).map(|u| u.location) else {
            return false;
        };
        self.leave_cell(id, from);
        self.cells.entry(to).or_default().push(id);
        if let Some(unit) = self.units.get_mut(&id) {
            unit.location = to;
            unit.is_on_map = true;
        }
        true
    }

    fn leave_cell(&mut self, id: UnitId, cell: TilePos) {
        if let Some(occupants) = self.cells.get_mut(&cell) {
            occupants.retain(|occupant| *occupant != id);
            if occupants.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }

    /// Mutable access for stats. Use [`SnapshotStore::move_unit`] to change location.
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitSnapshot> {
        self.units.get_mut(&id)
    }

    pub fn set_health(&mut self, id: UnitId, damage: u32, max_damage: u32) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.health = Some(HealthSnapshot::new(damage, max_damage));
        }
    }

    pub fn set_experience_level(&mut self, id: UnitId, level: u32) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.experience_level = Some(level);
        }
    }

    pub fn set_movement(&mut self, id: UnitId, remaining: f32) {
        if let Some(unit) = self.units.get_mut(&id) {
            unit.movement_remaining = Some(remaining);
        }
    }

    pub fn insert_army(&mut self, army: ArmySnapshot) {
        self.armies.insert(army.id, army);
    }

    pub fn remove_army(&mut self, id: ArmyId) -> Option<ArmySnapshot> {
        self.armies.remove(&id)
    }

    pub fn set_plot_owner(&mut self, cell: TilePos, owner: PlayerId) {
        self.plot_owners.insert(cell, owner);
    }

    pub fn set_relationship(
        &mut self,
        independent: IndependentId,
        viewer: PlayerId,
        relationship: Relationship,
    ) {
        self.relationships
            .insert((independent, viewer), relationship);
    }

    pub fn set_reveal_state(&mut self, viewer: PlayerId, cell: TilePos, state: RevealState) {
        self.reveal.insert((viewer, cell), state);
    }

    /// Reveal state for cells without an explicit entry.
    pub fn set_default_reveal(&mut self, state: RevealState) {
        self.default_reveal = state;
    }
}

impl UnitSnapshots for SnapshotStore {
    fn unit(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.units.get(&id).cloned()
    }

    fn definition(&self, type_id: UnitTypeId) -> Option<UnitDefinition> {
        self.definitions.get(&type_id).cloned()
    }

    fn army(&self, id: ArmyId) -> Option<ArmySnapshot> {
        self.armies.get(&id).cloned()
    }

    fn occupants(&self, cell: TilePos) -> Vec<UnitId> {
        self.cells.get(&cell).cloned().unwrap_or_default()
    }

    fn relationship(&self, independent: IndependentId, viewer: PlayerId) -> Relationship {
        self.relationships
            .get(&(independent, viewer))
            .copied()
            .unwrap_or(Relationship::NotApplicable)
    }

    fn reveal_state(&self, viewer: PlayerId, cell: TilePos) -> RevealState {
        self.reveal
            .get(&(viewer, cell))
            .copied()
            .unwrap_or(self.default_reveal)
    }

    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        self.players.get(&id).cloned()
    }

    fn independent_name(&self, independent: IndependentId) -> Option<String> {
        self.independent_names.get(&independent).cloned()
    }

    fn independent_of_unit(&self, unit: UnitId) -> IndependentId {
        self.players
            .get(&unit.owner)
            .and_then(|player| player.independent)
            .unwrap_or(IndependentId::NONE)
    }

    fn independent_at(&self, cell: TilePos) -> IndependentId {
        self.players
            .get(&self.plot_owner(cell))
            .and_then(|player| player.independent)
            .unwrap_or(IndependentId::NONE)
    }

    fn plot_owner(&self, cell: TilePos) -> PlayerId {
        self.plot_owners
            .get(&cell)
            .copied()
            .unwrap_or(PlayerId::NONE)
    }
}
