//! Periodic row-height sampling.

use crate::dom::Dom;

/// Decides which render passes sample a live row's height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightSampler {
    every: u32,
    since_last: u32,
    fixed: bool,
}

impl HeightSampler {
    /// Sample every `every` passes; never when `fixed`.
    pub fn new(every: u32, fixed: bool) -> Self {
        Self {
            every: every.max(1),
            since_last: 0,
            fixed,
        }
    }

    /// Count one pass; `true` when this pass should sample.
    pub fn tick(&mut self) -> bool {
        if self.fixed {
            return false;
        }
        self.since_last += 1;
        if self.since_last >= self.every {
            self.since_last = 0;
            true
        } else {
            false
        }
    }

    /// Whether sampling is disabled.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }
}

/// Rounded rendered height of `row`, or `None` when it has no height (for
/// instance when detached).
pub fn measure_row_height<D: Dom>(dom: &D, row: &D::Node) -> Option<f64> {
    let measured = dom.bounding_height(row).round();
    (measured.is_finite() && measured > 0.0).then_some(measured)
}

/// The measured height, if it differs from the assumed one.
pub fn corrected_height(measured: Option<f64>, assumed: f64) -> Option<f64> {
    measured.filter(|&height| height != assumed)
}
