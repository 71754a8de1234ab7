//! Flag session: owns every live flag and routes game notifications to it.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::anchors::{AnchorSlots, WorldAnchors};
use crate::error::FlagError;
use crate::flags::{
    FlagContext, FlagInstance, FlagKind, FlagMaker, FlagRegistry, IndependentFlagIndex,
    MatchQuery,
};
use crate::ids::{IndependentId, PlayerId, UnitId};
use crate::messages::{FlagActivated, FlagInput, FlagNotification};
use crate::settings::FlagSettings;
use crate::snapshot::{RevealState, UnitSnapshots};
use crate::tracking::FlagTracker;

pub mod deferred;
pub mod systems;

pub use deferred::{DeferredRefresh, DeferredRefreshQueue};

/// Unit selected by the last consumed flag activation.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SelectedUnit(pub Option<UnitId>);

/// Player whose point of view the flags are drawn from.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalObserver(pub PlayerId);

impl Default for LocalObserver {
    fn default() -> Self {
        Self(PlayerId::NONE)
    }
}

/// Mutable flag state shared by the session and the flag makers.
pub struct FlagState {
    tracker: FlagTracker,
    independents: IndependentFlagIndex,
    deferred: DeferredRefreshQueue,
    viewer: PlayerId,
    settings: FlagSettings,
    anchors: Box<dyn WorldAnchors + Send + Sync>,
}

impl FlagState {
    pub fn new(settings: FlagSettings, anchors: Box<dyn WorldAnchors + Send + Sync>) -> Self {
        Self {
            tracker: FlagTracker::new(),
            independents: IndependentFlagIndex::default(),
            deferred: DeferredRefreshQueue::default(),
            viewer: PlayerId::NONE,
            settings,
            anchors,
        }
    }

    pub fn viewer(&self) -> PlayerId {
        self.viewer
    }

    pub fn set_viewer(&mut self, viewer: PlayerId) {
        self.viewer = viewer;
    }

    pub fn settings(&self) -> &FlagSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &FlagTracker {
        &self.tracker
    }

    pub fn independents(&self) -> &IndependentFlagIndex {
        &self.independents
    }

    pub fn deferred(&self) -> &DeferredRefreshQueue {
        &self.deferred
    }

    pub fn flag(&self, unit: UnitId) -> Option<&FlagInstance> {
        self.tracker.get_flag(unit)
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.tracker.contains(unit)
    }

    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Queues a refresh for the next frame.
    pub fn schedule_refresh(&mut self, unit: UnitId, refresh: DeferredRefresh) -> bool {
        self.deferred.schedule(unit, refresh)
    }

    fn attach(
        &mut self,
        flag: &mut FlagInstance,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        let ctx = FlagContext::new(snapshots, self.viewer, &self.settings);
        flag.attach(&ctx, self.anchors.as_mut())
    }

    /// Hands an attached flag to the tracker and stacks its cell.
    pub fn track(
        &mut self,
        flag: FlagInstance,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        let unit = flag.unit_id();
        let kind = flag.kind();
        let independent = flag.independent();
        let cell = flag.cell();

        if let Err((err, mut rejected)) = self.tracker.add_child_for_tracking(flag) {
            rejected.detach(self.anchors.as_mut());
            return Err(err);
        }
        if kind == FlagKind::IndependentPower {
            self.independents.add(independent, unit);
        }
        if let Some(cell) = cell {
            self.recompute_stacking(cell, snapshots);
        }
        Ok(())
    }

    /// Detaches a unit's flag, forgets its pending refreshes and restacks
    /// the cell it stood in.
    pub fn despawn_flag(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        self.deferred.cancel(unit);
        let Some(mut flag) = self.tracker.remove_child_from_tracking(unit) else {
            return Err(FlagError::NotTracked(unit));
        };
        if flag.kind() == FlagKind::IndependentPower {
            self.independents.remove(flag.independent(), unit);
        }
        flag.detach(self.anchors.as_mut());
        if let Some(cell) = flag.cell() {
            self.recompute_stacking(cell, snapshots);
        }
        Ok(())
    }

    fn with_flag(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
        update: impl FnOnce(&mut FlagInstance, &FlagContext<'_>),
    ) -> Result<(), FlagError> {
        let ctx = FlagContext::new(snapshots, self.viewer, &self.settings);
        let flag = self
            .tracker
            .get_flag_mut(unit)
            .ok_or(FlagError::NotTracked(unit))?;
        update(flag, &ctx);
        Ok(())
    }

    pub fn update_health(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        self.with_flag(unit, snapshots, FlagInstance::update_health)
    }

    pub fn update_promotions(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        self.with_flag(unit, snapshots, FlagInstance::update_promotions)
    }

    pub fn update_army(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        self.with_flag(unit, snapshots, FlagInstance::update_army)
    }

    pub fn update_affinity(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        self.with_flag(unit, snapshots, FlagInstance::update_affinity)
    }

    /// Applies movement points and restacks the old and the new cell.
    pub fn update_movement(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<(), FlagError> {
        let ctx = FlagContext::new(snapshots, self.viewer, &self.settings);
        let flag = self
            .tracker
            .get_flag_mut(unit)
            .ok_or(FlagError::NotTracked(unit))?;
        let previous = flag.cell();
        let current = flag.update_movement(&ctx);

        if let Some(previous) = previous.filter(|cell| Some(*cell) != current) {
            self.recompute_stacking(previous, snapshots);
        }
        if let Some(current) = current {
            self.recompute_stacking(current, snapshots);
        }
        Ok(())
    }

    pub fn set_visibility(&mut self, unit: UnitId, state: RevealState) -> Result<(), FlagError> {
        let flag = self
            .tracker
            .get_flag_mut(unit)
            .ok_or(FlagError::NotTracked(unit))?;
        flag.set_visibility(state);
        Ok(())
    }

    pub fn hide(&mut self, unit: UnitId) -> Result<(), FlagError> {
        let flag = self
            .tracker
            .get_flag_mut(unit)
            .ok_or(FlagError::NotTracked(unit))?;
        flag.hide();
        Ok(())
    }

    pub fn show(&mut self, unit: UnitId, snapshots: &dyn UnitSnapshots) -> Result<(), FlagError> {
        self.with_flag(unit, snapshots, FlagInstance::show)
    }

    pub fn enable(&mut self, unit: UnitId) -> Result<(), FlagError> {
        let flag = self
            .tracker
            .get_flag_mut(unit)
            .ok_or(FlagError::NotTracked(unit))?;
        flag.enable();
        Ok(())
    }

    pub fn disable(&mut self, unit: UnitId) -> Result<(), FlagError> {
        let flag = self
            .tracker
            .get_flag_mut(unit)
            .ok_or(FlagError::NotTracked(unit))?;
        flag.disable();
        Ok(())
    }

    pub fn recompute_stacking(&mut self, cell: TilePos, snapshots: &dyn UnitSnapshots) -> usize {
        self.tracker
            .recompute_stacking(cell, snapshots, &self.settings)
    }

    /// Runs every refresh queued before this call. Flags detached in the
    /// meantime are skipped.
    pub fn run_deferred(&mut self, snapshots: &dyn UnitSnapshots) -> usize {
        let ctx = FlagContext::new(snapshots, self.viewer, &self.settings);
        let mut ran = 0;
        for (unit, refresh) in self.deferred.take() {
            let Some(flag) = self
                .tracker
                .get_flag_mut(unit)
                .filter(|flag| flag.is_attached())
            else {
                continue;
            };
            match refresh {
                DeferredRefresh::Army => flag.update_army(&ctx),
                DeferredRefresh::Promotions => flag.update_promotions(&ctx),
            }
            ran += 1;
        }
        ran
    }

    /// Refreshes affinity for one faction, or for every faction with `None`.
    pub fn refresh_affinities(
        &mut self,
        independent: Option<IndependentId>,
        snapshots: &dyn UnitSnapshots,
    ) -> usize {
        let units: Vec<UnitId> = match independent {
            Some(independent) => self.independents.units_of(independent).to_vec(),
            None => self
                .independents
                .iter()
                .flat_map(|(_, units)| units.iter().copied())
                .collect(),
        };

        let ctx = FlagContext::new(snapshots, self.viewer, &self.settings);
        let mut refreshed = 0;
        for unit in units {
            if let Some(flag) = self.tracker.get_flag_mut(unit) {
                flag.update_affinity(&ctx);
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Re-derives every flag, e.g. after the local observer changed.
    pub fn refresh_all(&mut self, snapshots: &dyn UnitSnapshots) {
        let ctx = FlagContext::new(snapshots, self.viewer, &self.settings);
        let mut cells = HashSet::new();
        for flag in self.tracker.iter_mut() {
            flag.refresh_all(&ctx);
            cells.extend(flag.cell());
        }
        for cell in cells {
            self.recompute_stacking(cell, snapshots);
        }
    }

    pub fn activate(&self, input: &FlagInput) -> Option<FlagActivated> {
        self.tracker.get_flag(input.unit)?.activate(input, self.viewer)
    }

    /// Detaches every flag and clears all indexes.
    pub fn teardown(&mut self) {
        self.deferred.clear();
        self.independents.clear();
        let mut detached = 0;
        for mut flag in self.tracker.drain() {
            flag.detach(self.anchors.as_mut());
            detached += 1;
        }
        if detached > 0 {
            info!("Detached {} unit flags", detached);
        }
    }

    /// Releases an untracked flag's resources.
    pub fn release(&mut self, flag: &mut FlagInstance) {
        flag.detach(self.anchors.as_mut());
    }
}

/// Flag session resource: the maker registry plus all flag state.
#[derive(Resource)]
pub struct UnitFlags {
    registry: FlagRegistry,
    state: FlagState,
}

impl UnitFlags {
    pub fn new(registry: FlagRegistry, settings: FlagSettings) -> Self {
        let anchors = AnchorSlots::new(settings.max_world_anchors);
        Self::with_anchors(registry, settings, Box::new(anchors))
    }

    pub fn with_anchors(
        registry: FlagRegistry,
        settings: FlagSettings,
        anchors: Box<dyn WorldAnchors + Send + Sync>,
    ) -> Self {
        Self {
            registry,
            state: FlagState::new(settings, anchors),
        }
    }

    pub fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    pub fn register_maker(&mut self, maker: Box<dyn FlagMaker>) -> Result<(), FlagError> {
        self.registry.register(maker)
    }

    fn resolve_kind(&self, unit: UnitId, snapshots: &dyn UnitSnapshots) -> Result<FlagKind, FlagError> {
        let Some(snapshot) = snapshots.unit(unit) else {
            error!("Could not create unit flag; no unit object for cid: {}", unit);
            return Err(FlagError::MissingUnit(unit));
        };
        let definition = snapshots.definition(snapshot.type_id);
        let query = MatchQuery {
            unit: &snapshot,
            definition: definition.as_ref(),
            snapshots,
        };
        Ok(self.registry.resolve(&query).kind())
    }

    /// Creates, attaches and tracks the flag of a unit that entered the map.
    pub fn spawn_flag(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<FlagKind, FlagError> {
        if self.state.contains(unit) {
            error!(
                "Attempt to add a unit flag for tracking but it's already being tracked: {}",
                unit
            );
            return Err(FlagError::DuplicateFlag(unit));
        }
        let kind = self.resolve_kind(unit, snapshots)?;
        let mut flag = FlagInstance::new(unit, kind);
        self.state.attach(&mut flag, snapshots)?;
        self.state.track(flag, snapshots)?;
        debug!("Spawned {} for unit {}", kind.type_name(), unit);
        Ok(kind)
    }

    /// Attaches a flag that never joins the tracker. The caller owns it and
    /// hands it back through [`FlagState::release`].
    pub fn attach_untracked(
        &mut self,
        unit: UnitId,
        snapshots: &dyn UnitSnapshots,
    ) -> Result<FlagInstance, FlagError> {
        let kind = self.resolve_kind(unit, snapshots)?;
        let mut flag = FlagInstance::new(unit, kind).untracked();
        self.state.attach(&mut flag, snapshots)?;
        Ok(flag)
    }

    /// Applies one notification: the session's own routes first, then every
    /// maker subscribed to its kind.
    pub fn handle_notification(
        &mut self,
        notification: &FlagNotification,
        snapshots: &dyn UnitSnapshots,
    ) {
        let result = match notification {
            FlagNotification::UnitAddedToMap { unit } => {
                self.spawn_flag(*unit, snapshots).map(|_| ())
            }
            FlagNotification::UnitRemovedFromMap { unit } => {
                self.state.despawn_flag(*unit, snapshots)
            }
            FlagNotification::UnitDamageChanged { unit } => {
                self.state.update_health(*unit, snapshots)
            }
            FlagNotification::UnitMoved { unit }
            | FlagNotification::UnitMovementPointsChanged { unit } => {
                self.state.update_movement(*unit, snapshots)
            }
            FlagNotification::UnitPromoted { unit } => {
                if self.state.contains(*unit) {
                    self.state
                        .schedule_refresh(*unit, DeferredRefresh::Promotions);
                } else {
                    // May be an opponent that is not visible yet
                    debug!("unit-flags: No flag for promoted unit {}", unit);
                }
                Ok(())
            }
            FlagNotification::UnitVisibilityChanged { unit, state } => {
                self.state.set_visibility(*unit, *state)
            }
            FlagNotification::BeforeUnload => {
                self.state.teardown();
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            debug!("unit-flags: {:?} not applied: {}", notification.kind(), err);
        }

        for maker in self.registry.subscribers(notification.kind()) {
            maker.on_notification(notification, &mut self.state, snapshots);
        }
    }
}

impl Deref for UnitFlags {
    type Target = FlagState;

    fn deref(&self) -> &FlagState {
        &self.state
    }
}

impl DerefMut for UnitFlags {
    fn deref_mut(&mut self) -> &mut FlagState {
        &mut self.state
    }
}
