//! Windowed row virtualization.
//!
//! [`VirtualScroller`] owns the DOM handles and the backing rows and drives
//! each render pass: compute the viewport, size the pool, patch and attach
//! the needed rows, detach the rest, then reposition the row container and
//! tell the host.
//!
//! The scroller is single-threaded. Scroll events only schedule an animation
//! frame ([`VirtualScroller::on_scroll_event`]); the frame callback
//! ([`VirtualScroller::on_animation_frame`]) renders, so there is at most one
//! render per frame and it always reads the latest scroll offset.

pub mod buffer;
pub mod diff;
pub mod measurement;
pub mod notify;
mod patch;
pub mod pool;
pub mod status;
pub mod types;
pub mod viewport;

pub use diff::{PatchOutcome, ScratchCells};
pub use pool::{PoolSlot, RowPool};
pub use status::ScrollerStatus;
pub use types::{
    Align, DomUpdate, Lifecycle, RenderOutcome, RenderStats, RowWindow, ScrollMode, ScrollSample,
    UnknownAlign, UpdateOptions,
};

use crate::config::{ConfigError, ScrollerConfig};
use crate::dom::{Dom, ScrollTarget};
use crate::logging::{RENDER_TARGET, SCROLL_TARGET};
use crate::model::{CdrRow, Handle, InitError, RowRecord, RowTypeCounts};
use measurement::{corrected_height, measure_row_height, HeightSampler};
use notify::{NotifyThrottle, FRAME_BUDGET_MS};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use viewport::{align_offset, compute_visible_range, resolve_scroll_top, ViewportInput};

/// Per-row markup function: one row record to its cells' markup.
pub type RenderRowFn<R> = Box<dyn Fn(&R) -> String>;

/// Host callback run after DOM updates.
pub type DomUpdateFn = Box<dyn FnMut(DomUpdate)>;

/// Style hints applied to the row container, best-effort.
const RENDER_HINTS: [(&str, &str); 2] = [("will-change", "transform"), ("contain", "content")];

/// DOM elements the scroller works with.
///
/// Every handle is required; they are optional here so a host can pass
/// whatever it found and let `initialize()` report what is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct DomHandles<N> {
    /// Scroll container.
    pub container: Option<N>,
    /// Element sized to the full virtual height.
    pub spacer: Option<N>,
    /// Row container.
    pub tbody: Option<N>,
    /// Outer table.
    pub table: Option<N>,
}

impl<N> Default for DomHandles<N> {
    fn default() -> Self {
        Self {
            container: None,
            spacer: None,
            tbody: None,
            table: None,
        }
    }
}

impl<N: Clone> DomHandles<N> {
    /// All four handles present.
    pub fn new(container: N, spacer: N, tbody: N, table: N) -> Self {
        Self {
            container: Some(container),
            spacer: Some(spacer),
            tbody: Some(tbody),
            table: Some(table),
        }
    }

    fn resolve(&self) -> Result<LiveHandles<N>, InitError> {
        let require = |handle: &Option<N>, which: Handle| {
            handle.clone().ok_or(InitError::MissingHandle(which))
        };
        let container = require(&self.container, Handle::Container)?;
        let spacer = require(&self.spacer, Handle::Spacer)?;
        let tbody = require(&self.tbody, Handle::Tbody)?;
        require(&self.table, Handle::Table)?;
        Ok(LiveHandles {
            container,
            spacer,
            tbody,
        })
    }
}

/// Handles validated by `initialize()`.
#[derive(Debug, Clone)]
struct LiveHandles<N> {
    container: N,
    spacer: N,
    tbody: N,
}

/// Construction options.
pub struct ScrollerOptions<N, R> {
    /// DOM handles.
    pub handles: DomHandles<N>,
    /// Numeric configuration, read once.
    pub config: ScrollerConfig,
    render_row: RenderRowFn<R>,
    on_dom_update: Option<DomUpdateFn>,
}

impl<N, R> ScrollerOptions<N, R> {
    /// Options with the default configuration.
    pub fn new(handles: DomHandles<N>, render_row: impl Fn(&R) -> String + 'static) -> Self {
        Self {
            handles,
            config: ScrollerConfig::default(),
            render_row: Box::new(render_row),
            on_dom_update: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: ScrollerConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the host's DOM-update callback.
    pub fn on_dom_update(mut self, callback: impl FnMut(DomUpdate) + 'static) -> Self {
        self.on_dom_update = Some(Box::new(callback));
        self
    }
}

impl<N> ScrollerOptions<N, CdrRow> {
    /// Options for CDR rows rendered with [`CdrRow::default_markup`].
    pub fn for_cdr_rows(handles: DomHandles<N>) -> Self {
        Self::new(handles, CdrRow::default_markup)
    }
}

/// Spacer inputs; the spacer is only rewritten when these change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpacerKey {
    data_len: usize,
    row_height_bits: u64,
    window: RowWindow,
}

/// Windowed renderer for a large row array.
pub struct VirtualScroller<D: Dom, R> {
    dom: D,
    handles: DomHandles<D::Node>,
    live: Option<LiveHandles<D::Node>>,
    config: ScrollerConfig,
    row_height: f64,
    buffer_size: usize,
    scroll_throttle_ms: u64,
    data: Vec<R>,
    render_row: RenderRowFn<R>,
    on_dom_update: Option<DomUpdateFn>,
    lifecycle: Lifecycle,
    mode: Option<ScrollMode>,
    frame_scheduled: bool,
    pool: RowPool<D::Node>,
    scratch: ScratchCells,
    window: Option<RowWindow>,
    last_sample: Option<ScrollSample>,
    buffer_multiplier: f64,
    last_offset_top: Option<f64>,
    last_spacer_key: Option<SpacerKey>,
    sampler: HeightSampler,
    notify: NotifyThrottle,
    render_count: u64,
}

impl<D: Dom, R: RowRecord> VirtualScroller<D, R> {
    /// Create an uninitialised scroller.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration is out of range.
    pub fn new(dom: D, options: ScrollerOptions<D::Node, R>) -> Result<Self, ConfigError> {
        options.config.validate()?;
        let config = options.config;

        Ok(Self {
            dom,
            handles: options.handles,
            live: None,
            row_height: config.row_height,
            buffer_size: config.buffer_size,
            scroll_throttle_ms: config.scroll_throttle_ms,
            data: Vec::new(),
            render_row: options.render_row,
            on_dom_update: options.on_dom_update,
            lifecycle: Lifecycle::Uninitialized,
            mode: None,
            frame_scheduled: false,
            pool: RowPool::new(),
            scratch: ScratchCells::new(),
            window: None,
            last_sample: None,
            buffer_multiplier: 1.0,
            last_offset_top: None,
            last_spacer_key: None,
            sampler: HeightSampler::new(config.measure_every, config.fixed_row_height),
            notify: NotifyThrottle::new(config.notify_every),
            render_count: 0,
            config,
        })
    }

    /// Validate handles, resolve the scroll mode and start listening.
    ///
    /// Calling it again once initialised is a no-op.
    ///
    /// # Errors
    ///
    /// [`InitError::MissingHandle`] when a handle is absent, and
    /// [`InitError::Destroyed`] after `destroy()`. The scroller stays
    /// uninitialised; the host should render without virtualization.
    pub fn initialize(&mut self) -> Result<(), InitError> {
        match self.lifecycle {
            Lifecycle::Initialized => return Ok(()),
            Lifecycle::Destroyed => {
                warn!(target: SCROLL_TARGET, "initialize() called on a destroyed scroller");
                return Err(InitError::Destroyed);
            }
            Lifecycle::Uninitialized => {}
        }

        let live = self.handles.resolve().inspect_err(|err| {
            warn!(target: SCROLL_TARGET, error = %err, "virtual scroller initialization failed");
        })?;

        let mode = if self.dom.scroll_height(&live.container) <= self.dom.client_height(&live.container)
        {
            ScrollMode::Page
        } else {
            ScrollMode::Container
        };

        self.dom
            .listen_scroll(ScrollTarget::Element(live.container.clone()));
        if mode == ScrollMode::Page {
            self.dom.listen_scroll(ScrollTarget::Window);
        }

        for (property, value) in RENDER_HINTS {
            if let Err(err) = self.dom.set_style(&live.tbody, property, value) {
                debug!(target: SCROLL_TARGET, error = %err, "rendering hint not applied");
            }
        }

        self.mode = Some(mode);
        self.live = Some(live);
        self.lifecycle = Lifecycle::Initialized;
        info!(target: SCROLL_TARGET, ?mode, "virtual scroller initialized");
        Ok(())
    }

    /// Replace the backing rows and render them from a fresh window.
    ///
    /// Before initialisation the rows are only stored.
    pub fn set_data(&mut self, rows: Vec<R>) -> RenderOutcome {
        self.data = rows;
        if self.config.adaptive_buffer {
            let (buffer, throttle) = self.config.optimized_for(self.data.len());
            self.buffer_size = buffer;
            self.scroll_throttle_ms = throttle;
        }
        self.window = None;
        self.last_spacer_key = None;

        let Some(live) = self.live_handles() else {
            return RenderOutcome::NotInitialized;
        };

        self.set_spacer_height(&live.spacer, self.data.len() as f64 * self.row_height);
        self.dom.clear_children(&live.tbody);

        if self.data.is_empty() {
            self.notify_host(DomUpdate {
                forced: true,
                structural_change: true,
            });
            return RenderOutcome::Empty;
        }

        let outcome = self.render(true);
        // The first pass shows the real row height; correct it right away.
        match self.recompute_row_height(&live) {
            Some(settled) => settled.after(outcome.stats()),
            None => outcome,
        }
    }

    /// Run one render pass.
    ///
    /// Unforced passes may be skipped when the window barely moved. When a
    /// row-height correction re-renders within the call, the returned stats
    /// describe the settled window and count rows from both passes.
    pub fn render(&mut self, force: bool) -> RenderOutcome {
        self.render_pass(force, true)
    }

    /// Scroll event from the container or the page.
    ///
    /// Schedules one animation frame; further events before it fires are
    /// coalesced into it.
    pub fn on_scroll_event(&mut self) {
        if self.lifecycle != Lifecycle::Initialized || self.frame_scheduled {
            return;
        }
        self.frame_scheduled = true;
        self.dom.request_animation_frame();
    }

    /// Animation-frame callback. A no-op once destroyed.
    pub fn on_animation_frame(&mut self) -> RenderOutcome {
        self.frame_scheduled = false;
        if self.lifecycle != Lifecycle::Initialized {
            return RenderOutcome::NotInitialized;
        }
        self.render(false)
    }

    /// Replace (when `row` is given) and re-patch one row.
    ///
    /// Returns whether a materialised row was patched. Out-of-range indices
    /// are ignored.
    pub fn update_row_at(&mut self, index: usize, row: Option<R>) -> bool {
        let Some(slot) = self.data.get_mut(index) else {
            return false;
        };
        if let Some(row) = row {
            *slot = row;
        }
        self.patch_row_at(index)
    }

    /// Overwrite `rows.len()` rows starting at `range_start`.
    ///
    /// Only materialised rows inside the range are re-patched; others pick up
    /// the new data when they scroll into view. With `force_render` a forced
    /// full pass runs instead. Rows past the end of the data are dropped.
    /// Returns how many rows were stored.
    pub fn update_rows(&mut self, range_start: usize, rows: Vec<R>, options: UpdateOptions) -> usize {
        let end = self
            .data
            .len()
            .min(range_start.saturating_add(rows.len()));
        if range_start >= end {
            return 0;
        }

        let stored = end - range_start;
        for (slot, row) in self.data[range_start..end].iter_mut().zip(rows) {
            *slot = row;
        }

        if options.force_render {
            self.render(true);
            return stored;
        }

        if let Some(overlap) = self.window.and_then(|w| w.overlap(range_start, end)) {
            for index in overlap {
                self.patch_row_at(index);
            }
        }
        stored
    }

    /// Scroll so that row `index` (clamped to the data) is aligned, then
    /// force a render.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> RenderOutcome {
        let Some(live) = self.live_handles() else {
            return RenderOutcome::NotInitialized;
        };

        let target = index.min(self.data.len().saturating_sub(1));
        let container_height = self.dom.client_height(&live.container);
        let offset = align_offset(target, self.row_height, container_height, align);

        match self.mode {
            Some(ScrollMode::Page) => {
                let top = self.dom.bounding_top(&live.container) + self.dom.page_scroll_y();
                self.dom.scroll_page_to(top + offset);
            }
            _ => self.dom.set_scroll_top(&live.container, offset),
        }
        debug!(target: SCROLL_TARGET, index = target, %align, offset, "scroll to index");

        self.render(true)
    }

    /// Diagnostic snapshot.
    pub fn status(&self) -> ScrollerStatus {
        ScrollerStatus {
            initialized: self.lifecycle == Lifecycle::Initialized,
            lifecycle: self.lifecycle,
            data_count: self.data.len(),
            row_height: self.row_height,
            buffer_size: self.buffer_size,
            scroll_throttle_ms: self.scroll_throttle_ms,
            buffer_multiplier: self.buffer_multiplier,
            last_window: self.window,
            scroll_mode: self.mode,
            pool_size: self.pool.len(),
            render_count: self.render_count,
        }
    }

    /// Stop listening. Terminal; a frame already scheduled does nothing.
    pub fn destroy(&mut self) {
        if self.lifecycle == Lifecycle::Initialized {
            if let Some(live) = &self.live {
                self.dom
                    .unlisten_scroll(ScrollTarget::Element(live.container.clone()));
            }
            if self.mode == Some(ScrollMode::Page) {
                self.dom.unlisten_scroll(ScrollTarget::Window);
            }
        }
        self.lifecycle = Lifecycle::Destroyed;
        info!(target: SCROLL_TARGET, "virtual scroller destroyed");
    }

    /// Backing rows.
    pub fn data(&self) -> &[R] {
        &self.data
    }

    /// The host DOM.
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// The host DOM, mutably (to move the scroll position, resize, ...).
    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    /// Resolved scroll mode; `None` before initialisation.
    pub fn scroll_mode(&self) -> Option<ScrollMode> {
        self.mode
    }

    /// Lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Slots in the row pool.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Pool slots, in slot order.
    pub fn pool_slots(&self) -> &[PoolSlot<D::Node>] {
        self.pool.slots()
    }

    /// Window of the last full pass.
    pub fn window(&self) -> Option<RowWindow> {
        self.window
    }

    /// Assumed row height.
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// Configuration the scroller was built with.
    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    fn live_handles(&self) -> Option<LiveHandles<D::Node>> {
        match self.lifecycle {
            Lifecycle::Initialized => self.live.clone(),
            _ => None,
        }
    }

    fn render_pass(&mut self, force: bool, allow_correction: bool) -> RenderOutcome {
        let Some(live) = self.live_handles() else {
            return RenderOutcome::NotInitialized;
        };

        if self.data.is_empty() {
            self.dom.clear_children(&live.tbody);
            self.set_spacer_height(&live.spacer, 0.0);
            self.last_spacer_key = None;
            self.window = None;
            self.notify_host(DomUpdate {
                forced: true,
                structural_change: true,
            });
            return RenderOutcome::Empty;
        }

        let started = Instant::now();
        let now_ms = self.dom.now_ms();
        let viewport = compute_visible_range(&ViewportInput {
            scroll_top: resolve_scroll_top(
                &self.dom,
                &live.container,
                self.mode.unwrap_or(ScrollMode::Container),
            ),
            now_ms,
            container_height: self.dom.client_height(&live.container),
            row_height: self.row_height,
            base_buffer: self.buffer_size,
            data_len: self.data.len(),
            previous_window: self.window,
            previous_sample: self.last_sample,
            force_render: force,
        });
        self.buffer_multiplier = viewport.buffer_multiplier;
        self.last_sample = Some(viewport.sample(now_ms));

        if viewport.should_skip {
            return RenderOutcome::Skipped;
        }

        let window = viewport.window;
        self.window = Some(window);
        let needed = window.len();
        self.pool.ensure(&mut self.dom, needed);

        let mut to_attach = Vec::new();
        let mut rows_patched = 0;
        let mut diff_time = Duration::ZERO;
        for (slot_index, index) in (window.start..window.end).enumerate() {
            let Some(slot) = self.pool.slot_mut(slot_index) else {
                break;
            };
            let needs_attach = self.dom.parent(&slot.row).as_ref() != Some(&live.tbody);

            let diff_started = Instant::now();
            let outcome = patch::sync_row(
                &mut self.dom,
                slot,
                &self.data[index],
                index,
                &self.render_row,
                &mut self.scratch,
            );
            diff_time += diff_started.elapsed();

            patch::report_outcome(&outcome, index, self.config.debug);
            if outcome.wrote() {
                rows_patched += 1;
            }
            if needs_attach {
                to_attach.push(slot.row.clone());
            }
        }

        let attached = to_attach.len();
        if attached > 0 {
            self.dom.append_children(&live.tbody, &to_attach);
        }
        let detached = self.pool.detach_extra(&mut self.dom, &live.tbody, needed);
        let cap = pool::pool_cap(needed, viewport.visible_rows, self.config.pool_screens_cap);
        let trimmed = self.pool.trim(&mut self.dom, &live.tbody, cap, needed);

        self.sync_spacer(&live.spacer, window);
        let offset_top = window.start as f64 * self.row_height;
        self.sync_offset(&live.tbody, offset_top);
        self.render_count += 1;

        let mut stats = RenderStats {
            window,
            attached,
            detached,
            trimmed,
            rows_patched,
            offset_top,
            buffer_multiplier: viewport.buffer_multiplier,
            row_height: self.row_height,
            notified: false,
        };

        if allow_correction && self.sampler.tick() {
            if let Some(settled) = self.recompute_row_height(&live) {
                return settled.after(Some(&stats));
            }
        }

        stats.notified = self.notify_host(DomUpdate {
            forced: force,
            structural_change: attached > 0 || detached > 0,
        });

        if self.config.debug {
            debug!(
                target: RENDER_TARGET,
                total_ms = started.elapsed().as_secs_f64() * 1000.0,
                diff_ms = diff_time.as_secs_f64() * 1000.0,
                needed,
                attached,
                detached,
                trimmed,
                start = window.start,
                end = window.end,
                buffer_multiplier = viewport.buffer_multiplier,
                data_len = self.data.len(),
                row_types = ?RowTypeCounts::tally(&self.data[window.start..window.end]),
                "render pass"
            );
        }

        RenderOutcome::Rendered(stats)
    }

    /// Sample the first pooled row and, if its real height differs from the
    /// assumed one, adopt it and re-render so window and offset agree with it.
    ///
    /// Returns the outcome of that settling pass.
    fn recompute_row_height(&mut self, live: &LiveHandles<D::Node>) -> Option<RenderOutcome> {
        if self.sampler.is_fixed() {
            return None;
        }
        let sample = self
            .pool
            .slot(0)
            .map(|slot| slot.row.clone())
            .filter(|row| self.dom.parent(row).as_ref() == Some(&live.tbody))?;
        let height = corrected_height(measure_row_height(&self.dom, &sample), self.row_height)?;

        debug!(
            target: RENDER_TARGET,
            from = self.row_height,
            to = height,
            "row height corrected"
        );
        self.row_height = height;
        self.set_spacer_height(&live.spacer, self.data.len() as f64 * height);
        Some(self.render_pass(true, false))
    }

    fn sync_spacer(&mut self, spacer: &D::Node, window: RowWindow) {
        let key = SpacerKey {
            data_len: self.data.len(),
            row_height_bits: self.row_height.to_bits(),
            window,
        };
        if self.last_spacer_key != Some(key) {
            self.set_spacer_height(spacer, self.data.len() as f64 * self.row_height);
            self.last_spacer_key = Some(key);
        }
    }

    fn set_spacer_height(&mut self, spacer: &D::Node, height: f64) {
        if let Err(err) = self.dom.set_style(spacer, "height", &format!("{height}px")) {
            debug!(target: RENDER_TARGET, error = %err, "spacer height not applied");
        }
    }

    fn sync_offset(&mut self, tbody: &D::Node, offset_top: f64) {
        if self.last_offset_top == Some(offset_top) {
            return;
        }
        let transform = format!("translate3d(0, {offset_top}px, 0)");
        match self.dom.set_style(tbody, "transform", &transform) {
            Ok(()) => self.last_offset_top = Some(offset_top),
            Err(err) => debug!(target: RENDER_TARGET, error = %err, "row offset not applied"),
        }
    }

    /// Run the host callback if the throttle lets `update` through.
    fn notify_host(&mut self, update: DomUpdate) -> bool {
        let Some(callback) = self.on_dom_update.as_mut() else {
            return false;
        };
        if !self.notify.should_notify(update) {
            return false;
        }

        let started = Instant::now();
        callback(update);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if self.config.debug && elapsed_ms > FRAME_BUDGET_MS {
            warn!(
                target: RENDER_TARGET,
                elapsed_ms,
                budget_ms = FRAME_BUDGET_MS,
                "DOM update callback exceeded frame budget"
            );
        }
        true
    }
}

#[cfg(test)]
#[path = "scroller_tests.rs"]
mod tests;
