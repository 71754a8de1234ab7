use bevy::prelude::*;

use super::{LocalObserver, SelectedUnit, UnitFlags};
use crate::messages::{FlagActivated, FlagInput, FlagNotification, UnhandledFlagInput};
use crate::snapshot::UnitSnapshots;

/// Runs refreshes queued during the previous frame.
pub fn run_deferred_flag_refreshes<P: UnitSnapshots + Resource>(
    mut flags: ResMut<UnitFlags>,
    snapshots: Res<P>,
) {
    if flags.deferred().is_empty() {
        return;
    }
    let ran = flags.run_deferred(&*snapshots);
    debug!("Ran {} deferred flag refreshes", ran);
}

pub fn route_flag_notifications<P: UnitSnapshots + Resource>(
    mut notifications: MessageReader<FlagNotification>,
    mut flags: ResMut<UnitFlags>,
    snapshots: Res<P>,
) {
    for notification in notifications.read() {
        flags.handle_notification(notification, &*snapshots);
    }
}

/// Hands input to the targeted flag. Inputs no flag consumes are passed on
/// as [`UnhandledFlagInput`].
pub fn route_flag_input(
    mut inputs: MessageReader<FlagInput>,
    flags: Res<UnitFlags>,
    mut selected: ResMut<SelectedUnit>,
    mut activated: MessageWriter<FlagActivated>,
    mut unhandled: MessageWriter<UnhandledFlagInput>,
) {
    for input in inputs.read() {
        match flags.activate(input) {
            Some(activation) => {
                selected.0 = Some(activation.unit);
                activated.write(activation);
            }
            None => {
                unhandled.write(UnhandledFlagInput(*input));
            }
        }
    }
}

/// Redraws every flag from the new observer's point of view.
pub fn sync_local_observer<P: UnitSnapshots + Resource>(
    observer: Res<LocalObserver>,
    mut flags: ResMut<UnitFlags>,
    snapshots: Res<P>,
) {
    if flags.viewer() == observer.0 {
        return;
    }
    info!("Unit flags now viewed by player {}", observer.0);
    flags.set_viewer(observer.0);
    flags.refresh_all(&*snapshots);
}
