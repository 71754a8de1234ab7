use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::ids::{ArmyId, PlayerId, UnitId};
use crate::snapshot::RevealState;

/// Game-state change notifications consumed by the flag bridge.
///
/// The host updates its [`crate::snapshot::UnitSnapshots`] provider first and
/// then writes the notification; flags re-read everything they need.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum FlagNotification {
    UnitAddedToMap { unit: UnitId },
    UnitRemovedFromMap { unit: UnitId },
    UnitDamageChanged { unit: UnitId },
    UnitMoved { unit: UnitId },
    UnitMovementPointsChanged { unit: UnitId },
    UnitPromoted { unit: UnitId },
    UnitAddedToArmy { initiating_unit: UnitId, army: ArmyId },
    UnitRemovedFromArmy { initiating_unit: UnitId, army: ArmyId },
    UnitVisibilityChanged { unit: UnitId, state: RevealState },
    DiplomacyEventStarted { location: Option<TilePos> },
    /// `location` is set for events tied to a plot, e.g. an independent
    /// power's affinity changing.
    DiplomacyEventEnded { location: Option<TilePos> },
    AffinityLevelChanged { player: PlayerId },
    /// UI teardown: every flag detaches.
    BeforeUnload,
}

/// Subscription key for [`FlagNotification`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    UnitAddedToMap,
    UnitRemovedFromMap,
    UnitDamageChanged,
    UnitMoved,
    UnitMovementPointsChanged,
    UnitPromoted,
    UnitAddedToArmy,
    UnitRemovedFromArmy,
    UnitVisibilityChanged,
    DiplomacyEventStarted,
    DiplomacyEventEnded,
    AffinityLevelChanged,
    BeforeUnload,
}

impl FlagNotification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            FlagNotification::UnitAddedToMap { .. } => NotificationKind::UnitAddedToMap,
            FlagNotification::UnitRemovedFromMap { .. } => NotificationKind::UnitRemovedFromMap,
            FlagNotification::UnitDamageChanged { .. } => NotificationKind::UnitDamageChanged,
            FlagNotification::UnitMoved { .. } => NotificationKind::UnitMoved,
            FlagNotification::UnitMovementPointsChanged { .. } => {
                NotificationKind::UnitMovementPointsChanged
            }
            FlagNotification::UnitPromoted { .. } => NotificationKind::UnitPromoted,
            FlagNotification::UnitAddedToArmy { .. } => NotificationKind::UnitAddedToArmy,
            FlagNotification::UnitRemovedFromArmy { .. } => NotificationKind::UnitRemovedFromArmy,
            FlagNotification::UnitVisibilityChanged { .. } => {
                NotificationKind::UnitVisibilityChanged
            }
            FlagNotification::DiplomacyEventStarted { .. } => {
                NotificationKind::DiplomacyEventStarted
            }
            FlagNotification::DiplomacyEventEnded { .. } => NotificationKind::DiplomacyEventEnded,
            FlagNotification::AffinityLevelChanged { .. } => {
                NotificationKind::AffinityLevelChanged
            }
            FlagNotification::BeforeUnload => NotificationKind::BeforeUnload,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Accept,
    MouseButtonLeft,
    TouchTap,
    Other,
}

impl InputAction {
    /// Primary confirm, click or tap.
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            InputAction::Accept | InputAction::MouseButtonLeft | InputAction::TouchTap
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    Start,
    Update,
    Finish,
}

/// Input gesture delivered to the flag of `unit`.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FlagInput {
    pub unit: UnitId,
    pub action: InputAction,
    pub phase: InputPhase,
    pub x: f32,
    pub y: f32,
}

/// A flag consumed an input and selected its unit.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FlagActivated {
    pub unit: UnitId,
    pub x: f32,
    pub y: f32,
}

/// Input the flag did not consume; other handlers may use it.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct UnhandledFlagInput(pub FlagInput);
