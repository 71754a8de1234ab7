use thiserror::Error;

use crate::ids::{PlayerId, UnitId, UnitTypeId};

/// Failures inside the flag subsystem.
///
/// None of these are fatal to the host: each one degrades a single flag and
/// is logged by whoever handles it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("no unit object for {0}")]
    MissingUnit(UnitId),
    #[error("missing unit definition for type {type_id} (unit {unit})")]
    MissingDefinition { unit: UnitId, type_id: UnitTypeId },
    #[error("no player object for {0}")]
    MissingPlayer(PlayerId),
    #[error("flag for {0} is already tracked")]
    DuplicateFlag(UnitId),
    #[error("flag for {0} is not tracked")]
    NotTracked(UnitId),
    #[error("flag maker '{0}' is already registered")]
    DuplicateMaker(&'static str),
    #[error("failed to create world anchor for {0}")]
    AnchorUnavailable(UnitId),
    #[error("flag for {0} was already attached once")]
    AlreadyAttached(UnitId),
    #[error("flag for {0} opted out of tracking")]
    TrackingDisabled(UnitId),
}
