//! Throttling of the host's DOM-update callback.

use super::types::DomUpdate;

/// Callbacks slower than this are reported when debugging.
pub const FRAME_BUDGET_MS: f64 = 16.0;

/// Lets through forced and structural passes, plus every `every`th pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyThrottle {
    every: u64,
    tick: u64,
}

impl NotifyThrottle {
    /// Throttle that lets every `every`th routine pass through.
    pub fn new(every: u32) -> Self {
        Self {
            every: u64::from(every.max(1)),
            tick: 0,
        }
    }

    /// Count one pass; `true` when the host should be called.
    pub fn should_notify(&mut self, update: DomUpdate) -> bool {
        self.tick += 1;
        update.forced || update.structural_change || self.tick % self.every == 0
    }
}
