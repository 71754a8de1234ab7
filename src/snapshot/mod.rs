//! Read-only view of the game simulation consumed by the flags.
//!
//! The flag layer never owns unit, army, player or diplomacy data. Every
//! refresh re-reads an immutable snapshot through [`UnitSnapshots`], so a unit
//! that disappeared between a notification and the redraw simply resolves to
//! `None`.

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::health::HealthSnapshot;
use crate::ids::{ArmyId, IndependentId, PlayerId, UnitId, UnitTypeId};

pub mod store;

pub use store::SnapshotStore;

#[derive(Debug, Clone, PartialEq)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub name: String,
    pub type_id: UnitTypeId,
    pub location: TilePos,
    pub health: Option<HealthSnapshot>,
    /// Any commander unit, with or without troops attached.
    pub is_commander: bool,
    /// Commander currently leading an army.
    pub is_army_commander: bool,
    pub can_attack: bool,
    pub army_id: Option<ArmyId>,
    /// Promotion level; `None` for units without an experience component.
    pub experience_level: Option<u32>,
    /// Remaining moves; `None` for units without a movement component.
    pub movement_remaining: Option<f32>,
    pub is_on_map: bool,
}

impl UnitSnapshot {
    pub fn owner(&self) -> PlayerId {
        self.id.owner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreClass {
    Military,
    Civilian,
    Support,
    Recon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationClass {
    Command,
    Combat,
    Civilian,
    Support,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    pub type_id: UnitTypeId,
    pub name: String,
    pub core_class: CoreClass,
    pub formation_class: FormationClass,
    pub can_earn_experience: bool,
    pub tier: Option<u8>,
    pub icon: String,
}

/// An army as seen by its commander's flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmySnapshot {
    pub id: ArmyId,
    /// Ordered members; the first one is always the commander.
    pub member_ids: Vec<UnitId>,
    /// Reported member count, commander included.
    pub unit_count: u32,
    /// Combat slots, commander not included.
    pub combat_unit_capacity: u32,
}

impl ArmySnapshot {
    pub fn commander(&self) -> Option<UnitId> {
        self.member_ids.first().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub primary_color: Color,
    pub secondary_color: Color,
    /// Set for independent powers.
    pub independent: Option<IndependentId>,
}

impl PlayerSnapshot {
    pub fn is_independent(&self) -> bool {
        self.independent.is_some()
    }
}

/// Affinity of an independent power towards a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Friendly,
    Hostile,
    Neutral,
    NotApplicable,
}

impl Relationship {
    pub fn label(&self) -> &'static str {
        match self {
            Relationship::Friendly => "Friendly",
            Relationship::Hostile => "Hostile",
            Relationship::Neutral => "Neutral",
            Relationship::NotApplicable => "Not applicable",
        }
    }
}

/// Fog-of-war state of a cell for one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealed,
    Visible,
}

/// Query service over the game simulation.
///
/// Implementations must return a consistent occupant list for a cell within
/// one call; the stacking code reads it exactly once per recompute.
pub trait UnitSnapshots {
    fn unit(&self, id: UnitId) -> Option<UnitSnapshot>;
    fn definition(&self, type_id: UnitTypeId) -> Option<UnitDefinition>;
    fn army(&self, id: ArmyId) -> Option<ArmySnapshot>;
    /// Units in a cell, in the provider's stable stacking order.
    fn occupants(&self, cell: TilePos) -> Vec<UnitId>;
    fn relationship(&self, independent: IndependentId, viewer: PlayerId) -> Relationship;
    fn reveal_state(&self, viewer: PlayerId, cell: TilePos) -> RevealState;
    fn player(&self, id: PlayerId) -> Option<PlayerSnapshot>;
    /// Display name of an independent faction, if it has its own.
    fn independent_name(&self, independent: IndependentId) -> Option<String>;
    fn independent_of_unit(&self, unit: UnitId) -> IndependentId;
    fn independent_at(&self, cell: TilePos) -> IndependentId;
    fn plot_owner(&self, cell: TilePos) -> PlayerId;
}

#[cfg(test)]
mod tests;
