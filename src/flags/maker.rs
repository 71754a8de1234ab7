use crate::bridge::FlagState;
use crate::messages::{FlagNotification, NotificationKind};
use crate::snapshot::{UnitDefinition, UnitSnapshot, UnitSnapshots};

/// Concrete flag variant a maker instantiates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Generic,
    ArmyCommander,
    IndependentPower,
}

impl FlagKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FlagKind::Generic => "unit-flag",
            FlagKind::ArmyCommander => "army-commander-flag",
            FlagKind::IndependentPower => "unit-flags-independent-powers",
        }
    }
}

/// What a maker gets to look at when deciding whether it fits a unit.
pub struct MatchQuery<'a> {
    pub unit: &'a UnitSnapshot,
    pub definition: Option<&'a UnitDefinition>,
    pub snapshots: &'a dyn UnitSnapshots,
}

/// Notification kinds a maker wants routed to [`FlagMaker::on_notification`].
#[derive(Debug, Default, Clone)]
pub struct Subscriptions {
    kinds: Vec<NotificationKind>,
}

impl Subscriptions {
    pub fn subscribe(&mut self, kind: NotificationKind) -> &mut Self {
        if !self.kinds.contains(&kind) {
            self.kinds.push(kind);
        }
        self
    }

    pub fn kinds(&self) -> &[NotificationKind] {
        &self.kinds
    }
}

/// A rule deciding which flag variant a unit gets, plus the event handling
/// specific to that variant.
pub trait FlagMaker: Send + Sync + 'static {
    /// Whether this maker is the right one for the unit. `others` is the
    /// full candidate list so a maker can defer to a better match; it is
    /// `None` when asked on behalf of another maker.
    fn matches(&self, query: &MatchQuery<'_>, others: Option<&[Box<dyn FlagMaker>]>) -> bool;

    /// Unique name of the widget type this maker creates.
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> FlagKind;

    /// Evaluation order in the registry; higher goes first. Equal
    /// priorities keep registration order.
    fn priority(&self) -> i32 {
        0
    }

    /// Called exactly once, when the maker is registered.
    fn on_registry_init(&self, _subscriptions: &mut Subscriptions) {}

    fn on_notification(
        &self,
        _notification: &FlagNotification,
        _state: &mut FlagState,
        _snapshots: &dyn UnitSnapshots,
    ) {
    }
}

/// Default flag. Matches only when no other maker does.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericFlagMaker;

impl FlagMaker for GenericFlagMaker {
    fn matches(&self, query: &MatchQuery<'_>, others: Option<&[Box<dyn FlagMaker>]>) -> bool {
        let Some(others) = others else {
            return true;
        };
        // Any other match is assumed to be better than this default
        !others
            .iter()
            .filter(|maker| maker.type_name() != self.type_name())
            .any(|maker| maker.matches(query, None))
    }

    fn type_name(&self) -> &'static str {
        FlagKind::Generic.type_name()
    }

    fn kind(&self) -> FlagKind {
        FlagKind::Generic
    }
}
