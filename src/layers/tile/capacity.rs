use crate::tiles::{grid::TileRange, source::TileProvider};

/// Sizes the provider's cache before a frame is drawn.
///
/// Asking for the exact visible count plus an overshoot keeps small viewport jitter
/// from evicting tiles that are about to be drawn again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityAdvisor {
    overshoot: usize,
}

impl CapacityAdvisor {
    pub fn new(overshoot: usize) -> Self {
        Self { overshoot }
    }

    pub fn overshoot(&self) -> usize {
        self.overshoot
    }

    pub fn set_overshoot(&mut self, overshoot: usize) {
        self.overshoot = overshoot;
    }

    /// Capacity to request for `range`: never below its tile count
    pub fn capacity_for(&self, range: &TileRange) -> usize {
        range.len().saturating_add(self.overshoot)
    }

    /// Tell `provider` how many tiles the frame covering `range` needs; returns that number
    pub fn advise(&self, range: &TileRange, provider: &dyn TileProvider) -> usize {
        let needed = self.capacity_for(range);
        provider.ensure_capacity(needed);
        needed
    }
}
