use std::fmt;

use serde::{Deserialize, Serialize};

/// A player slot in the game. Major civilizations, independent powers and
/// the spectator all share this id space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub i32);

impl PlayerId {
    /// No player (unowned plot, invalid unit).
    pub const NONE: PlayerId = PlayerId(-1);
    /// Pure spectator: may select any unit.
    pub const OBSERVER: PlayerId = PlayerId(-2);

    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a unit for its whole lifetime on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId {
    pub owner: PlayerId,
    pub local: u32,
}

impl UnitId {
    pub const INVALID: UnitId = UnitId {
        owner: PlayerId::NONE,
        local: u32::MAX,
    };

    pub fn new(owner: PlayerId, local: u32) -> Self {
        Self { owner, local }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.owner, self.local)
        } else {
            write!(f, "invalid")
        }
    }
}

/// Index of an independent power (a village faction that may become a city-state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndependentId(pub i32);

impl IndependentId {
    pub const NONE: IndependentId = IndependentId(-1);

    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for IndependentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTypeId(pub u32);

impl fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
