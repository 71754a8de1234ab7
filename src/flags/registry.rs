use std::collections::HashMap;

use bevy::prelude::*;

use super::army::ArmyCommanderFlagMaker;
use super::independent::IndependentPowerFlagMaker;
use super::maker::{FlagMaker, GenericFlagMaker, MatchQuery, Subscriptions};
use crate::error::FlagError;
use crate::messages::NotificationKind;

static DEFAULT_MAKER: GenericFlagMaker = GenericFlagMaker;

/// Ordered list of flag makers.
///
/// Makers are evaluated by descending [`FlagMaker::priority`], then in
/// registration order; the first one reporting a match wins.
#[derive(Default)]
pub struct FlagRegistry {
    makers: Vec<Box<dyn FlagMaker>>,
    routes: HashMap<NotificationKind, Vec<&'static str>>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in army commander, independent power and
    /// generic makers.
    pub fn with_default_makers() -> Self {
        let mut registry = Self::new();
        let makers: [Box<dyn FlagMaker>; 3] = [
            Box::new(GenericFlagMaker),
            Box::new(ArmyCommanderFlagMaker),
            Box::new(IndependentPowerFlagMaker),
        ];
        for maker in makers {
            if let Err(err) = registry.register(maker) {
                warn!("unit-flags: {}", err);
            }
        }
        registry
    }

    /// Adds a maker and runs its one-time init. A second maker with the same
    /// type name is rejected and the registry is left untouched.
    pub fn register(&mut self, maker: Box<dyn FlagMaker>) -> Result<(), FlagError> {
        let name = maker.type_name();
        if self.makers.iter().any(|m| m.type_name() == name) {
            return Err(FlagError::DuplicateMaker(name));
        }

        let mut subscriptions = Subscriptions::default();
        maker.on_registry_init(&mut subscriptions);
        for kind in subscriptions.kinds() {
            self.routes.entry(*kind).or_default().push(name);
        }

        let position = self
            .makers
            .iter()
            .position(|m| m.priority() < maker.priority())
            .unwrap_or(self.makers.len());
        debug!(
            "Registered flag maker '{}' at position {} (priority {})",
            name,
            position,
            maker.priority()
        );
        self.makers.insert(position, maker);
        Ok(())
    }

    /// Picks the maker for a unit. Falls back to the generic flag when no
    /// registered maker matches.
    pub fn resolve(&self, query: &MatchQuery<'_>) -> &dyn FlagMaker {
        self.makers
            .iter()
            .find(|maker| maker.matches(query, Some(self.makers.as_slice())))
            .map(|maker| maker.as_ref())
            .unwrap_or(&DEFAULT_MAKER)
    }

    /// Makers in evaluation order.
    pub fn makers(&self) -> impl Iterator<Item = &dyn FlagMaker> + '_ {
        self.makers.iter().map(|maker| maker.as_ref())
    }

    /// Makers subscribed to a notification kind, in registration order.
    pub fn subscribers(&self, kind: NotificationKind) -> impl Iterator<Item = &dyn FlagMaker> + '_ {
        self.routes
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(move |name| self.makers.iter().find(|m| m.type_name() == *name))
            .map(|maker| maker.as_ref())
    }

    pub fn len(&self) -> usize {
        self.makers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.makers.is_empty()
    }
}
