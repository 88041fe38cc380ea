//! Diagnostic snapshot of a scroller.

use super::types::{Lifecycle, RowWindow, ScrollMode};
use serde::Serialize;

/// Snapshot returned by `status()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollerStatus {
    /// Listening and rendering.
    pub initialized: bool,
    /// Lifecycle state.
    pub lifecycle: Lifecycle,
    /// Rows in the backing array.
    pub data_count: usize,
    /// Assumed row height.
    pub row_height: f64,
    /// Base buffer in effect.
    pub buffer_size: usize,
    /// Scroll throttle in effect.
    pub scroll_throttle_ms: u64,
    /// Multiplier from the last computed viewport.
    pub buffer_multiplier: f64,
    /// Window of the last full pass.
    pub last_window: Option<RowWindow>,
    /// Resolved scroll mode.
    pub scroll_mode: Option<ScrollMode>,
    /// Slots in the row pool.
    pub pool_size: usize,
    /// Full render passes so far.
    pub render_count: u64,
}
