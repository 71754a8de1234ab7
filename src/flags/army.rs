use super::instance::{FlagContext, FlagInstance};
use super::maker::{FlagKind, FlagMaker, MatchQuery, Subscriptions};
use super::skin::{LayerShape, StackLayer};
use crate::bridge::{DeferredRefresh, FlagState};
use crate::ids::UnitId;
use crate::messages::{FlagNotification, NotificationKind};
use crate::snapshot::{ArmySnapshot, FormationClass, UnitSnapshots};

/// Flag for every commander unit, with or without an army behind it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArmyCommanderFlagMaker;

impl FlagMaker for ArmyCommanderFlagMaker {
    fn matches(&self, query: &MatchQuery<'_>, others: Option<&[Box<dyn FlagMaker>]>) -> bool {
        if !query.unit.is_commander {
            return false;
        }
        // Independent commanders belong to the higher ranked flag
        !others.is_some_and(|others| {
            others
                .iter()
                .filter(|maker| maker.priority() > self.priority())
                .any(|maker| maker.matches(query, None))
        })
    }

    fn type_name(&self) -> &'static str {
        FlagKind::ArmyCommander.type_name()
    }

    fn kind(&self) -> FlagKind {
        FlagKind::ArmyCommander
    }

    fn priority(&self) -> i32 {
        10
    }

    fn on_registry_init(&self, subscriptions: &mut Subscriptions) {
        subscriptions
            .subscribe(NotificationKind::UnitAddedToArmy)
            .subscribe(NotificationKind::UnitRemovedFromArmy);
    }

    fn on_notification(
        &self,
        notification: &FlagNotification,
        state: &mut FlagState,
        snapshots: &dyn UnitSnapshots,
    ) {
        match notification {
            FlagNotification::UnitAddedToArmy {
                initiating_unit,
                army,
            }
            | FlagNotification::UnitRemovedFromArmy {
                initiating_unit,
                army,
            } => {
                // Army counts settle one frame after the event
                let commander = snapshots.army(*army).and_then(|army| army.commander());
                let mut targets = vec![*initiating_unit];
                targets.extend(commander.filter(|unit| unit != initiating_unit));
                for unit in targets {
                    if state.contains(unit) {
                        state.schedule_refresh(unit, DeferredRefresh::Army);
                    }
                }
            }
            _ => {}
        }
    }
}

impl FlagInstance {
    /// Rebuilds the army overlay and stat line from scratch.
    ///
    /// Commanders without an army lose any layers left from a previous one.
    pub fn refresh_army(&mut self, ctx: &FlagContext<'_>) {
        if !self.is_attached() || self.kind() != FlagKind::ArmyCommander {
            return;
        }
        let Some(unit) = self.snapshot(ctx) else {
            return;
        };
        let army = unit.army_id.and_then(|id| ctx.snapshots.army(id));
        let Some(skin) = self.skin.as_mut() else {
            return;
        };

        let Some(army) = army else {
            skin.stack_layers = Vec::new();
            skin.army_stats = None;
            return;
        };

        let (primary, secondary) = (skin.primary, skin.secondary);
        skin.stack_layers = (1..army.unit_count)
            .flat_map(|slot| {
                [
                    StackLayer {
                        shape: LayerShape::Inner,
                        stack_offset: slot,
                        tint: primary,
                    },
                    StackLayer {
                        shape: LayerShape::Outer,
                        stack_offset: slot,
                        tint: secondary,
                    },
                ]
            })
            .rev()
            .collect();
        skin.army_stats = Some(army_stats(&army, ctx.snapshots));
    }

    pub fn update_army(&mut self, ctx: &FlagContext<'_>) {
        self.refresh_army(ctx);
    }
}

/// Combat members against capacity, civilians appended as `+ N`.
///
/// The commander is part of `unit_count` but not of the capacity, so it is
/// left out of both sides.
pub fn army_stats(army: &ArmySnapshot, snapshots: &dyn UnitSnapshots) -> String {
    let civilians = army
        .member_ids
        .iter()
        .skip(1)
        .filter(|member| is_civilian(**member, snapshots))
        .count() as u32;
    let unit_count = army.unit_count.saturating_sub(1);

    if civilians > 0 {
        format!(
            "{}|{} + {}",
            unit_count.saturating_sub(civilians),
            army.combat_unit_capacity,
            civilians
        )
    } else {
        format!("{}|{}", unit_count, army.combat_unit_capacity)
    }
}

fn is_civilian(member: UnitId, snapshots: &dyn UnitSnapshots) -> bool {
    snapshots
        .unit(member)
        .and_then(|unit| snapshots.definition(unit.type_id))
        .is_some_and(|definition| definition.formation_class == FormationClass::Civilian)
}
