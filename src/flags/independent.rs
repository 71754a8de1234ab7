use std::collections::HashMap;

use bevy::prelude::*;

use super::instance::{FlagContext, FlagInstance};
use super::maker::{FlagKind, FlagMaker, MatchQuery, Subscriptions};
use crate::bridge::FlagState;
use crate::ids::{IndependentId, UnitId};
use crate::messages::{FlagNotification, NotificationKind};
use crate::snapshot::{Relationship, UnitSnapshots};

/// Flag for units owned by an independent power (villages that may grow
/// into city-states).
#[derive(Debug, Default, Clone, Copy)]
pub struct IndependentPowerFlagMaker;

impl FlagMaker for IndependentPowerFlagMaker {
    fn matches(&self, query: &MatchQuery<'_>, _others: Option<&[Box<dyn FlagMaker>]>) -> bool {
        query
            .snapshots
            .player(query.unit.owner())
            .is_some_and(|player| player.is_independent())
    }

    fn type_name(&self) -> &'static str {
        FlagKind::IndependentPower.type_name()
    }

    fn kind(&self) -> FlagKind {
        FlagKind::IndependentPower
    }

    fn priority(&self) -> i32 {
        20
    }

    fn on_registry_init(&self, subscriptions: &mut Subscriptions) {
        subscriptions
            .subscribe(NotificationKind::DiplomacyEventStarted)
            .subscribe(NotificationKind::DiplomacyEventEnded)
            .subscribe(NotificationKind::AffinityLevelChanged);
    }

    fn on_notification(
        &self,
        notification: &FlagNotification,
        state: &mut FlagState,
        snapshots: &dyn UnitSnapshots,
    ) {
        match notification {
            FlagNotification::DiplomacyEventStarted { .. } => {
                // Affinity changes are rare, refresh every faction
                state.refresh_affinities(None, snapshots);
            }
            FlagNotification::DiplomacyEventEnded { location } => {
                // Events without a location are not about affinity
                let Some(location) = location else {
                    return;
                };
                // Nobody owning the plot is valid for some events
                if snapshots.player(snapshots.plot_owner(*location)).is_none() {
                    return;
                }
                let independent = snapshots.independent_at(*location);
                if !independent.is_valid() {
                    return;
                }
                state.refresh_affinities(Some(independent), snapshots);
            }
            FlagNotification::AffinityLevelChanged { player } => {
                if *player == state.viewer() {
                    state.refresh_affinities(None, snapshots);
                }
            }
            _ => {}
        }
    }
}

/// Independent-power flags grouped by faction, for batched affinity updates.
#[derive(Debug, Default, Clone)]
pub struct IndependentFlagIndex {
    flags: HashMap<IndependentId, Vec<UnitId>>,
}

impl IndependentFlagIndex {
    /// Returns `false` and leaves the index unchanged on a duplicate.
    pub fn add(&mut self, independent: IndependentId, unit: UnitId) -> bool {
        let flags = self.flags.entry(independent).or_default();
        if flags.contains(&unit) {
            error!(
                "unit-flags-independent-powers: Attempt to add a IP unit flag with index {} for factory tracking but its already being tracked. cid: {}",
                independent, unit
            );
            return false;
        }
        flags.push(unit);
        true
    }

    pub fn remove(&mut self, independent: IndependentId, unit: UnitId) -> bool {
        let Some(flags) = self.flags.get_mut(&independent) else {
            warn!(
                "unit-flags-independent-powers: Attempt to remove child from tracking at factory but no children of that index '{}' exist.",
                independent
            );
            return false;
        };
        let Some(position) = flags.iter().position(|existing| *existing == unit) else {
            warn!(
                "unit-flags-independent-powers: Was unable to find flag to delete from factory. index: {}, unit: {}",
                independent, unit
            );
            return false;
        };
        flags.remove(position);
        if flags.is_empty() {
            self.flags.remove(&independent);
        }
        true
    }

    pub fn units_of(&self, independent: IndependentId) -> &[UnitId] {
        self.flags
            .get(&independent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndependentId, &[UnitId])> + '_ {
        self.flags
            .iter()
            .map(|(independent, units)| (*independent, units.as_slice()))
    }

    /// Number of factions with at least one flag.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }
}

impl FlagInstance {
    /// Affinity of the viewer towards the owning faction. Owners that are
    /// gone or not independent yield [`Relationship::NotApplicable`].
    pub fn relationship(&self, ctx: &FlagContext<'_>) -> Relationship {
        let owner = self.unit_id().owner;
        let Some(player) = ctx.snapshots.player(owner) else {
            warn!(
                "unit-flags-independent-powers: Unable to get affinity relationship due to null player from playerID {}",
                owner
            );
            return Relationship::NotApplicable;
        };
        if !player.is_independent() {
            warn!(
                "unit-flags-independent-powers: Unable to get affinity relationship due to non-independent player from playerID {}, name: {}",
                owner, player.name
            );
            return Relationship::NotApplicable;
        }
        ctx.snapshots.relationship(self.independent, ctx.viewer)
    }

    pub fn refresh_affinity(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() || self.kind() != FlagKind::IndependentPower {
            return;
        }
        let relationship = self.relationship(ctx);
        if relationship == Relationship::NotApplicable {
            warn!("Village banner unable to determine affinity relationship.");
            return;
        }
        if let Some(skin) = self.skin.as_mut() {
            skin.affinity = Some(relationship);
        }
    }

    pub fn update_affinity(&mut self, ctx: &FlagContext<'_>) {
        self.refresh_affinity(ctx);
        self.refresh_tooltip(ctx);
    }
}
