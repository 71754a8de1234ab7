use crate::ids::UnitId;

/// Refresh that has to wait for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredRefresh {
    /// Army counts are stale inside the membership event itself.
    Army,
    Promotions,
}

/// One-shot refreshes keyed by unit, run on the next frame.
#[derive(Debug, Default, Clone)]
pub struct DeferredRefreshQueue {
    pending: Vec<(UnitId, DeferredRefresh)>,
}

impl DeferredRefreshQueue {
    /// Returns `false` when the same refresh is already queued.
    pub fn schedule(&mut self, unit: UnitId, refresh: DeferredRefresh) -> bool {
        if self.is_pending(unit, refresh) {
            return false;
        }
        self.pending.push((unit, refresh));
        true
    }

    /// Drops every queued refresh of `unit`.
    pub fn cancel(&mut self, unit: UnitId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(queued, _)| *queued != unit);
        before - self.pending.len()
    }

    /// Empties the queue, returning entries in scheduling order.
    pub fn take(&mut self) -> Vec<(UnitId, DeferredRefresh)> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self, unit: UnitId, refresh: DeferredRefresh) -> bool {
        self.pending.contains(&(unit, refresh))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
