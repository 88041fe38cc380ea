//! Value types shared by the scroller components.

use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Half-open slice `[start, end)` of the data array materialised as rows.
///
/// # Invariants
/// - `start <= end`
/// - `end <= data.len()` for the data it was computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RowWindow {
    /// First materialised data index (inclusive).
    pub start: usize,
    /// Last materialised data index (exclusive).
    pub end: usize,
}

impl RowWindow {
    /// Create a window.
    ///
    /// # Panics
    /// In debug builds, panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "window start {start} past end {end}");
        Self { start, end }
    }

    /// Number of materialised rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window materialises nothing.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `index` is materialised.
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// Intersection with `[start, end)`, if non-empty.
    pub fn overlap(&self, start: usize, end: usize) -> Option<Range<usize>> {
        let lo = start.max(self.start);
        let hi = end.min(self.end);
        (lo < hi).then_some(lo..hi)
    }

    /// Pool slot that holds data `index` during the current pass.
    pub fn slot_of(&self, index: usize) -> Option<usize> {
        self.contains(index).then(|| index - self.start)
    }
}

/// Scroll offset observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Scroll offset in pixels.
    pub offset: f64,
    /// Clock reading in milliseconds.
    pub timestamp_ms: f64,
}

/// Where the scroll offset comes from.
///
/// Resolved once by `initialize()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollMode {
    /// The container overflows and scrolls natively.
    Container,
    /// The container does not overflow; the page viewport scrolls instead.
    Page,
}

/// Instance lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    /// Constructed, or `initialize()` failed.
    #[default]
    Uninitialized,
    /// Listening and rendering.
    Initialized,
    /// Torn down. Terminal.
    Destroyed,
}

/// Alignment for `scroll_to_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Row at the top edge.
    #[default]
    Start,
    /// Row near the vertical middle.
    Center,
    /// Row at the bottom edge.
    End,
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Align::Start => "start",
            Align::Center => "center",
            Align::End => "end",
        })
    }
}

/// Error for an unrecognised alignment name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alignment '{0}' (expected start, center or end)")]
pub struct UnknownAlign(pub String);

impl FromStr for Align {
    type Err = UnknownAlign;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Align::Start),
            "center" => Ok(Align::Center),
            "end" => Ok(Align::End),
            other => Err(UnknownAlign(other.to_string())),
        }
    }
}

/// What one full render pass did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderStats {
    /// Window materialised by the pass.
    pub window: RowWindow,
    /// Rows attached to the row container.
    pub attached: usize,
    /// Rows detached from the row container (kept in the pool).
    pub detached: usize,
    /// Pool slots dropped for exceeding capacity.
    pub trimmed: usize,
    /// Rows whose cell content was written.
    pub rows_patched: usize,
    /// Row container offset in pixels.
    pub offset_top: f64,
    /// Buffer multiplier derived from scroll speed.
    pub buffer_multiplier: f64,
    /// Assumed row height after the pass.
    pub row_height: f64,
    /// Whether the host callback ran.
    pub notified: bool,
}

impl RenderStats {
    /// Rows were attached or detached.
    pub fn is_structural(&self) -> bool {
        self.attached > 0 || self.detached > 0
    }
}

/// Result of `render()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// Not initialised, or destroyed; nothing happened.
    NotInitialized,
    /// No data: the row container was cleared and the host notified.
    Empty,
    /// Window unchanged enough to skip; only scroll bookkeeping updated.
    Skipped,
    /// A full pass ran.
    Rendered(RenderStats),
}

impl RenderOutcome {
    /// Stats of a full pass.
    pub fn stats(&self) -> Option<&RenderStats> {
        match self {
            RenderOutcome::Rendered(stats) => Some(stats),
            _ => None,
        }
    }

    /// Fold the row counts of an earlier pass in the same call into this
    /// (settling) pass, so the stats cover everything the call did.
    pub fn after(mut self, earlier: Option<&RenderStats>) -> Self {
        if let (RenderOutcome::Rendered(stats), Some(earlier)) = (&mut self, earlier) {
            stats.attached += earlier.attached;
            stats.detached += earlier.detached;
            stats.trimmed += earlier.trimmed;
            stats.rows_patched += earlier.rows_patched;
        }
        self
    }
}

/// Signal handed to the host's DOM-update callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DomUpdate {
    /// The pass was forced.
    pub forced: bool,
    /// Rows were attached or detached (or the table was emptied).
    pub structural_change: bool,
}

/// Options for `update_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOptions {
    /// Run a forced full render after updating the backing data.
    pub force_render: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod row_window {
        use super::*;

        #[test]
        fn len_and_contains() {
            let window = RowWindow::new(10, 25);
            assert_eq!(window.len(), 15);
            assert!(window.contains(10));
            assert!(window.contains(24));
            assert!(!window.contains(25));
            assert!(!RowWindow::default().contains(0));
            assert!(RowWindow::default().is_empty());
        }

        #[test]
        fn overlap_clips_to_window() {
            let window = RowWindow::new(0, 20);
            assert_eq!(window.overlap(10, 12), Some(10..12));
            assert_eq!(window.overlap(15, 40), Some(15..20));
            assert_eq!(window.overlap(20, 30), None);
        }

        #[test]
        fn slot_of_is_relative_to_start() {
            let window = RowWindow::new(30, 40);
            assert_eq!(window.slot_of(30), Some(0));
            assert_eq!(window.slot_of(39), Some(9));
            assert_eq!(window.slot_of(29), None);
        }

        #[test]
        #[should_panic]
        #[cfg(debug_assertions)]
        fn new_panics_when_start_greater_than_end() {
            RowWindow::new(5, 4);
        }
    }

    #[test]
    fn align_parses_and_displays() {
        for align in [Align::Start, Align::Center, Align::End] {
            assert_eq!(align.to_string().parse::<Align>(), Ok(align));
        }
        assert!("middle".parse::<Align>().is_err());
    }

    #[test]
    fn render_outcome_serializes_with_tag() {
        let json = serde_json::to_value(RenderOutcome::Skipped).unwrap();
        assert_eq!(json["outcome"], "skipped");
    }
}
