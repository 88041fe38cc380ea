//! Viewport calculation.
//!
//! Pure: turns the current scroll state into the window of data indices to
//! materialise, sized by a speed-dependent buffer.

use super::buffer::BufferConfig;
use super::types::{Align, RowWindow, ScrollMode, ScrollSample};
use crate::dom::Dom;

/// Everything the calculator reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportInput {
    /// Resolved scroll offset (see [`resolve_scroll_top`]).
    pub scroll_top: f64,
    /// Clock reading for this pass.
    pub now_ms: f64,
    /// Visible height of the scroll container.
    pub container_height: f64,
    /// Assumed row height.
    pub row_height: f64,
    /// Configured base buffer, in rows.
    pub base_buffer: usize,
    /// Data length.
    pub data_len: usize,
    /// Window of the previous non-skipped pass.
    pub previous_window: Option<RowWindow>,
    /// Scroll sample of the previous pass, skipped or not.
    pub previous_sample: Option<ScrollSample>,
    /// Disable skipping and the forward clamp.
    pub force_render: bool,
}

/// Calculator output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Scroll offset the window was computed for.
    pub scroll_top: f64,
    /// Scroll speed in px/ms.
    pub speed: f64,
    /// Speed-derived buffer multiplier.
    pub buffer_multiplier: f64,
    /// Buffer actually applied on each side, in rows.
    pub effective_buffer: usize,
    /// Rows that fit in the container.
    pub visible_rows: usize,
    /// Window to materialise.
    pub window: RowWindow,
    /// The caller should skip DOM work.
    pub should_skip: bool,
}

impl Viewport {
    /// Sample to remember for the next speed computation.
    pub fn sample(&self, now_ms: f64) -> ScrollSample {
        ScrollSample {
            offset: self.scroll_top,
            timestamp_ms: now_ms,
        }
    }
}

/// Current scroll offset for the resolved mode.
///
/// Container mode reads the container's native offset. Page mode uses how
/// far the container's top edge has moved above the viewport, clamped at 0.
pub fn resolve_scroll_top<D: Dom>(dom: &D, container: &D::Node, mode: ScrollMode) -> f64 {
    match mode {
        ScrollMode::Container => dom.scroll_top(container),
        ScrollMode::Page => (-dom.bounding_top(container)).max(0.0),
    }
}

/// Scroll speed in px/ms. Zero without a previous sample.
pub fn scroll_speed(previous: Option<ScrollSample>, scroll_top: f64, now_ms: f64) -> f64 {
    match previous {
        Some(prev) => (scroll_top - prev.offset).abs() / (now_ms - prev.timestamp_ms).max(1.0),
        None => 0.0,
    }
}

/// `ceil(container_height / row_height)`.
pub fn visible_rows_count(container_height: f64, row_height: f64) -> usize {
    if row_height <= 0.0 || !container_height.is_finite() {
        return 0;
    }
    (container_height / row_height).ceil().max(0.0) as usize
}

/// Minimum start-index movement that defeats skipping.
pub fn skip_threshold(visible_rows: usize) -> usize {
    (visible_rows / 2).max(1)
}

/// Scroll offset that aligns row `index` within a container.
///
/// `Start` puts the row at the top, `Center` puts it half a container below
/// the top, and `End` puts it at the bottom edge. Never negative.
pub fn align_offset(index: usize, row_height: f64, container_height: f64, align: Align) -> f64 {
    let offset = index as f64 * row_height;
    match align {
        Align::Start => offset,
        Align::Center => (offset - (container_height / 2.0).floor()).max(0.0),
        Align::End => (offset - (container_height - row_height).max(0.0)).max(0.0),
    }
}

/// Compute the window for `input`.
///
/// The window starts `effective_buffer` rows above the first visible row and
/// spans the visible rows plus a buffer on each side, clipped to the data.
/// When not forced and the offset has not moved backwards since the last
/// sample, the start never falls below the previous window's start, so a
/// speed-driven buffer increase cannot pull the window up during a forward
/// scroll.
pub fn compute_visible_range(input: &ViewportInput) -> Viewport {
    let speed = scroll_speed(input.previous_sample, input.scroll_top, input.now_ms);
    let visible_rows = visible_rows_count(input.container_height, input.row_height);

    let limits = BufferConfig::for_row_height(input.row_height);
    let buffer_multiplier = limits.multiplier(speed);
    let effective_buffer = input
        .base_buffer
        .max((visible_rows as f64 * buffer_multiplier).ceil() as usize);

    let first_visible = (input.scroll_top.max(0.0) / input.row_height).floor() as usize;
    let mut start = first_visible.saturating_sub(effective_buffer);

    let moving_forward = input
        .previous_sample
        .is_some_and(|prev| input.scroll_top >= prev.offset);
    if let (false, true, Some(prev)) = (input.force_render, moving_forward, input.previous_window) {
        start = start.max(prev.start);
    }

    let start = start.min(input.data_len);
    let end = input
        .data_len
        .min(start.saturating_add(visible_rows + 2 * effective_buffer));
    let window = RowWindow::new(start, end);

    let should_skip = !input.force_render
        && input.previous_window.is_some_and(|prev| {
            prev.start.abs_diff(start) < skip_threshold(visible_rows) && prev.end == end
        });

    Viewport {
        scroll_top: input.scroll_top,
        speed,
        buffer_multiplier,
        effective_buffer,
        visible_rows,
        window,
        should_skip,
    }
}
