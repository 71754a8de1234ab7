//! Unit Flags - on-map markers for every unit of a tile-based strategy game
//!
//! This library picks a flag variant per unit, stacks flags sharing a map cell
//! and keeps them in sync with game notifications.

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::bridge::systems::{
    route_flag_input, route_flag_notifications, run_deferred_flag_refreshes, sync_local_observer,
};
use crate::bridge::{LocalObserver, SelectedUnit, UnitFlags};
use crate::flags::FlagRegistry;
use crate::messages::{FlagActivated, FlagInput, FlagNotification, UnhandledFlagInput};
use crate::settings::FlagSettings;
use crate::snapshot::{SnapshotStore, UnitSnapshots};

pub mod anchors;
pub mod bridge;
pub mod constants;
pub mod error;
pub mod flags;
pub mod health;
pub mod ids;
pub mod messages;
pub mod settings;
pub mod snapshot;
pub mod tracking;

#[cfg(test)]
pub mod test_utils;

/// Wires the flag session into an app.
///
/// `P` is the snapshot provider resource the flags read from; the host must
/// insert it and keep it current before sending [`FlagNotification`]s.
pub struct UnitFlagPlugin<P = SnapshotStore> {
    settings: FlagSettings,
    _provider: PhantomData<fn() -> P>,
}

impl<P> UnitFlagPlugin<P> {
    pub fn with_settings(settings: FlagSettings) -> Self {
        Self {
            settings,
            _provider: PhantomData,
        }
    }
}

impl<P> Default for UnitFlagPlugin<P> {
    fn default() -> Self {
        Self::with_settings(FlagSettings::default())
    }
}

impl<P: UnitSnapshots + Resource> Plugin for UnitFlagPlugin<P> {
    fn build(&self, app: &mut App) {
        app.insert_resource(UnitFlags::new(
            FlagRegistry::with_default_makers(),
            self.settings.clone(),
        ))
        .init_resource::<LocalObserver>()
        .init_resource::<SelectedUnit>()
        .add_message::<FlagNotification>()
        .add_message::<FlagInput>()
        .add_message::<FlagActivated>()
        .add_message::<UnhandledFlagInput>()
        // Work queued during one frame runs at the start of the next
        .add_systems(PreUpdate, run_deferred_flag_refreshes::<P>)
        .add_systems(
            Update,
            (
                sync_local_observer::<P>.run_if(resource_changed::<LocalObserver>),
                route_flag_notifications::<P>,
                route_flag_input,
            )
                .chain(),
        );
    }
}
