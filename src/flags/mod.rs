//! Unit flags: the on-map marker showing a unit's owner, health and rank.
//!
//! Makers decide which flag variant a unit gets, instances hold the live
//! visual state of one unit's flag.

pub mod army;
pub mod independent;
pub mod instance;
pub mod maker;
pub mod registry;
pub mod skin;

pub use army::ArmyCommanderFlagMaker;
pub use independent::{IndependentFlagIndex, IndependentPowerFlagMaker};
pub use instance::{FlagContext, FlagInstance, FlagLifecycle};
pub use maker::{FlagKind, FlagMaker, GenericFlagMaker, MatchQuery, Subscriptions};
pub use registry::FlagRegistry;
pub use skin::{FlagSkin, HealthBar, IconCategory, LayerShape, StackLayer};
