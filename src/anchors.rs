use std::collections::HashMap;

use bevy::prelude::*;

use crate::ids::UnitId;

/// Slot in the world-to-screen projection that keeps a flag above its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnchorHandle(pub u32);

/// Projection service binding screen-space widgets to moving units.
pub trait WorldAnchors {
    /// Returns `None` when no anchor could be created.
    fn register_unit_anchor(&mut self, unit: UnitId, height: f32) -> Option<AnchorHandle>;
    fn unregister_unit_anchor(&mut self, handle: AnchorHandle);
}

/// Fixed-capacity anchor table.
#[derive(Debug, Clone)]
pub struct AnchorSlots {
    capacity: usize,
    next: u32,
    live: HashMap<AnchorHandle, (UnitId, f32)>,
}

impl AnchorSlots {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next: 0,
            live: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn unit_of(&self, handle: AnchorHandle) -> Option<UnitId> {
        self.live.get(&handle).map(|(unit, _)| *unit)
    }
}

impl WorldAnchors for AnchorSlots {
    fn register_unit_anchor(&mut self, unit: UnitId, height: f32) -> Option<AnchorHandle> {
        if self.live.len() >= self.capacity {
            return None;
        }
        let handle = AnchorHandle(self.next);
        self.next = self.next.wrapping_add(1);
        self.live.insert(handle, (unit, height));
        Some(handle)
    }

    fn unregister_unit_anchor(&mut self, handle: AnchorHandle) {
        if self.live.remove(&handle).is_none() {
            warn!("Unregistering unknown world anchor {:?}", handle);
        }
    }
}
