//! Live flags keyed by unit, and per-cell stacking.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::error::FlagError;
use crate::flags::FlagInstance;
use crate::ids::UnitId;
use crate::settings::FlagSettings;
use crate::snapshot::UnitSnapshots;

/// Every tracked flag of the session, at most one per unit.
#[derive(Debug, Default)]
pub struct FlagTracker {
    flags: HashMap<UnitId, FlagInstance>,
}

impl FlagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a flag. A second flag for the same unit is rejected
    /// and handed back; the tracked one is left untouched.
    pub fn add_child_for_tracking(
        &mut self,
        flag: FlagInstance,
    ) -> Result<(), (FlagError, FlagInstance)> {
        let unit = flag.unit_id();
        if !flag.is_tracked() {
            return Err((FlagError::TrackingDisabled(unit), flag));
        }
        if self.flags.contains_key(&unit) {
            error!(
                "Attempt to add a unit flag for tracking but it's already being tracked: {}",
                unit
            );
            return Err((FlagError::DuplicateFlag(unit), flag));
        }
        self.flags.insert(unit, flag);
        Ok(())
    }

    pub fn remove_child_from_tracking(&mut self, unit: UnitId) -> Option<FlagInstance> {
        let flag = self.flags.remove(&unit);
        if flag.is_none() {
            warn!(
                "Unit flag manager was unable to find flag to remove from tracking: {}",
                unit
            );
        }
        flag
    }

    pub fn get_flag(&self, unit: UnitId) -> Option<&FlagInstance> {
        self.flags.get(&unit)
    }

    pub fn get_flag_mut(&mut self, unit: UnitId) -> Option<&mut FlagInstance> {
        self.flags.get_mut(&unit)
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.flags.contains_key(&unit)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn units(&self) -> Vec<UnitId> {
        self.flags.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagInstance> + '_ {
        self.flags.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FlagInstance> + '_ {
        self.flags.values_mut()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = FlagInstance> + '_ {
        self.flags.drain().map(|(_, flag)| flag)
    }

    /// Re-assigns stack offsets in `cell` following the provider's occupant
    /// order. The occupant list is read once, before any flag is touched.
    ///
    /// Returns how many flags were restacked. An occupant without a flag is
    /// logged and skipped; its slot is still counted so the others keep
    /// their position.
    pub fn recompute_stacking(
        &mut self,
        cell: TilePos,
        snapshots: &dyn UnitSnapshots,
        settings: &FlagSettings,
    ) -> usize {
        let occupants = snapshots.occupants(cell);
        let mut restacked = 0;
        for (position, unit) in occupants.iter().enumerate() {
            let Some(flag) = self.flags.get_mut(unit) else {
                error!(
                    "recompute_stacking(): unit flag for unit {} at ({}, {}) is not found",
                    unit, cell.x, cell.y
                );
                continue;
            };
            flag.update_top(position as u32, settings);
            restacked += 1;
        }
        restacked
    }
}
