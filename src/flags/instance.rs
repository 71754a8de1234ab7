use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use super::maker::FlagKind;
use super::skin::{FlagSkin, IconCategory};
use crate::anchors::{AnchorHandle, WorldAnchors};
use crate::constants::{FALLBACK_PRIMARY_COLOR, FALLBACK_SECONDARY_COLOR, tier_chevron_path};
use crate::error::FlagError;
use crate::health::{HealthBand, fill_percent, health_fraction};
use crate::ids::{IndependentId, PlayerId, UnitId};
use crate::messages::{FlagActivated, FlagInput, InputPhase};
use crate::settings::FlagSettings;
use crate::snapshot::{CoreClass, RevealState, UnitSnapshot, UnitSnapshots};

/// Everything a flag reads while refreshing.
#[derive(Clone, Copy)]
pub struct FlagContext<'a> {
    pub snapshots: &'a dyn UnitSnapshots,
    pub viewer: PlayerId,
    pub settings: &'a FlagSettings,
}

impl<'a> FlagContext<'a> {
    pub fn new(
        snapshots: &'a dyn UnitSnapshots,
        viewer: PlayerId,
        settings: &'a FlagSettings,
    ) -> Self {
        Self {
            snapshots,
            viewer,
            settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagLifecycle {
    /// Created, not attached yet.
    Pending,
    Attached,
    /// Attach failed; every update is a no-op.
    Degraded,
    /// Detached for good. Instances are never re-attached.
    Detached,
}

/// The live flag of one unit.
///
/// A flag owns no game data: each refresh re-reads its unit through the
/// [`FlagContext`] and skips the update when the unit is gone.
#[derive(Debug, Clone)]
pub struct FlagInstance {
    unit: UnitId,
    kind: FlagKind,
    tracked: bool,
    lifecycle: FlagLifecycle,
    hidden: bool,
    stack_offset: u32,
    cell: Option<TilePos>,
    anchor: Option<AnchorHandle>,
    pub(super) independent: IndependentId,
    pub(super) skin: Option<FlagSkin>,
}

impl FlagInstance {
    pub fn new(unit: UnitId, kind: FlagKind) -> Self {
        Self {
            unit,
            kind,
            tracked: true,
            lifecycle: FlagLifecycle::Pending,
            hidden: false,
            stack_offset: 0,
            cell: None,
            anchor: None,
            independent: IndependentId::NONE,
            skin: None,
        }
    }

    /// Opts out of manager tracking: no world anchor, no stacking.
    pub fn untracked(mut self) -> Self {
        self.tracked = false;
        self
    }

    pub fn unit_id(&self) -> UnitId {
        self.unit
    }

    pub fn kind(&self) -> FlagKind {
        self.kind
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    pub fn lifecycle(&self) -> FlagLifecycle {
        self.lifecycle
    }

    pub fn is_attached(&self) -> bool {
        self.lifecycle == FlagLifecycle::Attached
    }

    /// Explicit hide override, independent of fog of war.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn stack_offset(&self) -> u32 {
        self.stack_offset
    }

    /// Cell the flag was last placed in.
    pub fn cell(&self) -> Option<TilePos> {
        self.cell
    }

    pub fn anchor(&self) -> Option<AnchorHandle> {
        self.anchor
    }

    pub fn independent(&self) -> IndependentId {
        self.independent
    }

    pub fn skin(&self) -> Option<&FlagSkin> {
        self.skin.as_ref()
    }

    /// Binds the flag to its unit, builds the skin and performs one full
    /// refresh. Stacking is left to the caller once the flag is tracked.
    pub fn attach(
        &mut self,
        ctx: &FlagContext<'_>,
        anchors: &mut dyn WorldAnchors,
    ) -> Result<(), FlagError> {
        if self.lifecycle != FlagLifecycle::Pending {
            warn!("unit-flags: flag for {} was already attached once", self.unit);
            return Err(FlagError::AlreadyAttached(self.unit));
        }

        let Some(unit) = ctx.snapshots.unit(self.unit) else {
            error!(
                "Could not attach unit flag; no unit object for cid: {}",
                self.unit
            );
            self.lifecycle = FlagLifecycle::Degraded;
            return Err(FlagError::MissingUnit(self.unit));
        };

        let owner = ctx.snapshots.player(unit.owner());
        let mut skin = match (&owner, self.kind) {
            // Independent flags are tinted through their affinity instead
            (_, FlagKind::IndependentPower) | (None, _) => {
                FlagSkin::new(FALLBACK_PRIMARY_COLOR, FALLBACK_SECONDARY_COLOR)
            }
            (Some(player), _) => FlagSkin::new(player.primary_color, player.secondary_color),
        };

        if self.kind == FlagKind::IndependentPower {
            if owner.is_none() {
                error!(
                    "unit-flags-independent-powers: failed to get player of independent in attaching flag. playerID: {} for {}",
                    unit.owner(),
                    self.unit
                );
                self.lifecycle = FlagLifecycle::Degraded;
                return Err(FlagError::MissingPlayer(unit.owner()));
            }
            self.independent = ctx.snapshots.independent_of_unit(self.unit);
            skin.hostile_outline = true;
        } else {
            skin.tier_chevron = ctx
                .snapshots
                .definition(unit.type_id)
                .and_then(|definition| definition.tier)
                .map(tier_chevron_path);
        }
        self.skin = Some(skin);

        if self.tracked {
            self.anchor = anchors.register_unit_anchor(self.unit, ctx.settings.anchor_height);
            if self.anchor.is_none() {
                error!("{}", FlagError::AnchorUnavailable(self.unit));
            }
        }

        self.lifecycle = FlagLifecycle::Attached;
        self.refresh_all(ctx);
        Ok(())
    }

    /// Releases the world anchor. Safe to call more than once.
    pub fn detach(&mut self, anchors: &mut dyn WorldAnchors) {
        if self.lifecycle == FlagLifecycle::Detached {
            return;
        }
        if let Some(handle) = self.anchor.take() {
            anchors.unregister_unit_anchor(handle);
        }
        self.lifecycle = FlagLifecycle::Detached;
    }

    /// Current snapshot of the bound unit; logs when it is gone.
    pub(super) fn snapshot(&self, ctx: &FlagContext<'_>) -> Option<UnitSnapshot> {
        let unit = ctx.snapshots.unit(self.unit);
        if unit.is_none() {
            error!(
                "Failed attempt to get a unit for unit flag: {}",
                self.unit
            );
        }
        unit
    }

    /// Re-derives every visual from the current snapshot.
    pub fn refresh_all(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() {
            return;
        }
        let Some(unit) = self.snapshot(ctx) else {
            return;
        };

        if let Some(skin) = self.skin.as_mut() {
            skin.highlight = unit.owner() == ctx.viewer;
        }
        self.set_movement_points(&unit, ctx);
        self.refresh_icon(ctx);
        self.refresh_health(ctx);
        self.refresh_tooltip(ctx);
        match self.kind {
            FlagKind::Generic => self.refresh_promotions(ctx),
            FlagKind::ArmyCommander => {
                self.refresh_promotions(ctx);
                self.refresh_army(ctx);
            }
            FlagKind::IndependentPower => self.refresh_affinity(ctx),
        }
        if !self.hidden {
            self.set_visibility(ctx.snapshots.reveal_state(ctx.viewer, unit.location));
        }
        if unit.is_on_map {
            self.cell = Some(unit.location);
        }
    }

    pub fn refresh_health(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() {
            return;
        }
        let Some(unit) = self.snapshot(ctx) else {
            return;
        };
        let Some(skin) = self.skin.as_mut() else {
            error!(
                "unit-flags: refresh_health(): missing health bar for cid: {}",
                unit.id
            );
            return;
        };

        let fraction = health_fraction(unit.health);
        skin.health.band = HealthBand::from_fraction(fraction, ctx.settings);
        skin.health.fill_percent = fill_percent(fraction);
        skin.with_healthbar = unit.health.is_some_and(|health| health.is_damaged());
    }

    pub fn refresh_icon(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() {
            return;
        }
        let Some(unit) = self.snapshot(ctx) else {
            return;
        };
        let Some(definition) = ctx.snapshots.definition(unit.type_id) else {
            warn!(
                "unit-flags: Cannot set unit flag icon due to missing unit definition. type: {} cid: {}",
                unit.type_id, unit.id
            );
            return;
        };

        let commander = match self.kind {
            FlagKind::IndependentPower => unit.is_commander,
            _ => unit.is_army_commander,
        };
        let category = if commander {
            Some(IconCategory::ArmyCommander)
        } else if unit.can_attack {
            Some(IconCategory::Combat)
        } else if !matches!(definition.core_class, CoreClass::Support | CoreClass::Recon) {
            Some(IconCategory::Civilian)
        } else {
            None
        };

        if let Some(skin) = self.skin.as_mut() {
            skin.icon_category = category;
            skin.icon = Some(definition.icon);
            skin.owned = self.kind != FlagKind::IndependentPower && unit.owner() == ctx.viewer;
        }
    }

    pub fn refresh_tooltip(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() {
            return;
        }
        let Some(player) = ctx.snapshots.player(self.unit.owner) else {
            return;
        };
        let unit_name = ctx
            .snapshots
            .unit(self.unit)
            .map(|unit| unit.name)
            .unwrap_or_else(|| format!("ERROR, unit: {}", self.unit));

        let lines = match self.kind {
            FlagKind::IndependentPower => {
                let relationship = ctx.snapshots.relationship(self.independent, ctx.viewer);
                let faction = ctx
                    .snapshots
                    .independent_name(self.independent)
                    .unwrap_or(player.name);
                vec![
                    format!("Independent Power: {}", faction),
                    unit_name,
                    relationship.label().to_string(),
                ]
            }
            _ => vec![player.name, unit_name],
        };
        if let Some(skin) = self.skin.as_mut() {
            skin.tooltip = lines;
        }
    }

    pub fn refresh_promotions(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() || self.kind == FlagKind::IndependentPower {
            return;
        }
        let Some(unit) = self.snapshot(ctx) else {
            return;
        };
        let Some(definition) = ctx.snapshots.definition(unit.type_id) else {
            warn!(
                "unit-flag: Cannot set promotions due to missing unit definition. type: {} cid: {}",
                unit.type_id, unit.id
            );
            return;
        };
        let Some(skin) = self.skin.as_mut() else {
            return;
        };

        skin.promotion_badge = None;
        if !definition.can_earn_experience {
            return;
        }
        if let Some(level) = unit.experience_level.filter(|level| *level > 0) {
            skin.promotion_badge = Some(level);
            skin.has_promotions = true;
        }
    }

    fn set_movement_points(&mut self, unit: &UnitSnapshot, ctx: &FlagContext<'_>) {
        // Only the viewer's own units show movement state
        let shown = self.kind != FlagKind::IndependentPower && unit.owner() == ctx.viewer;
        if let Some(skin) = self.skin.as_mut() {
            skin.no_movement =
                shown && unit.movement_remaining.is_some_and(|remaining| remaining <= 0.0);
        }
    }

    /// Applies movement points and returns the cell the unit now stands in,
    /// or `None` when the unit is gone or off the map.
    pub fn update_movement(&mut self, ctx: &FlagContext<'_>) -> Option<TilePos> {
        if !self.is_attached() {
            return None;
        }
        // Movement can come in while a unit is being destroyed
        let unit = ctx.snapshots.unit(self.unit)?;
        if !unit.is_on_map {
            return None;
        }
        self.set_movement_points(&unit, ctx);
        self.cell = Some(unit.location);
        Some(unit.location)
    }

    /// Maps fog of war to visibility. Revealed-but-not-visible renders the
    /// same as hidden. No-op while the flag is explicitly hidden.
    pub fn set_visibility(&mut self, state: RevealState) {
        if self.hidden {
            return;
        }
        if let Some(skin) = self.skin.as_mut() {
            skin.hidden = match state {
                RevealState::Hidden | RevealState::Revealed => true,
                RevealState::Visible => false,
            };
        }
    }

    pub fn hide(&mut self) {
        self.hidden = true;
        if let Some(skin) = self.skin.as_mut() {
            skin.hidden = true;
        }
    }

    pub fn show(&mut self, ctx: &FlagContext<'_>) {
        self.hidden = false;
        if !self.is_attached() {
            return;
        }
        if let Some(unit) = self.snapshot(ctx) {
            self.set_visibility(ctx.snapshots.reveal_state(ctx.viewer, unit.location));
        }
    }

    pub fn enable(&mut self) {
        if let Some(skin) = self.skin.as_mut() {
            skin.disabled = false;
        }
    }

    pub fn disable(&mut self) {
        if let Some(skin) = self.skin.as_mut() {
            skin.disabled = true;
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.skin.as_ref().is_some_and(|skin| skin.disabled)
    }

    /// Returns the activation when the input selects this flag's unit.
    /// `None` means the input was not consumed and should propagate.
    pub fn activate(&self, input: &FlagInput, viewer: PlayerId) -> Option<FlagActivated> {
        if input.phase != InputPhase::Finish || self.is_disabled() {
            return None;
        }
        if !input.action.is_primary() {
            return None;
        }
        if !self.is_attached() || !self.unit.is_valid() {
            warn!(
                "Attempt to activate a unit-flag but invalid associated unit: {}",
                self.unit
            );
            return None;
        }

        // Owner, or a pure spectator for flags that allow it
        let spectator = viewer == PlayerId::OBSERVER && self.kind != FlagKind::IndependentPower;
        if viewer != self.unit.owner && !spectator {
            return None;
        }
        Some(FlagActivated {
            unit: self.unit,
            x: input.x,
            y: input.y,
        })
    }

    /// Moves the flag up by `position` stack slots.
    pub fn update_top(&mut self, position: u32, settings: &FlagSettings) {
        self.stack_offset = position;
        if let Some(skin) = self.skin.as_mut() {
            skin.top_px = position as f32 * -settings.stack_spacing_px;
        }
    }

    pub fn update_health(&mut self, ctx: &FlagContext<'_>) {
        self.refresh_health(ctx);
    }

    pub fn update_promotions(&mut self, ctx: &FlagContext<'_>) {
        self.refresh_promotions(ctx);
    }
}
