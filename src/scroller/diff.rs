//! Cell-level row diff.
//!
//! Patches a live row toward freshly rendered markup with as few writes as
//! possible: unchanged markup costs nothing, and for changed markup only the
//! cell properties that differ are written.

use crate::dom::markup::{self, Element, Node};
use crate::dom::Dom;
use crate::model::ContractViolation;

/// Data attributes synced on every cell.
pub const DATA_ATTRS: [&str; 3] = ["data-pdd", "data-atime", "data-y-toggleable"];

/// Extra attributes synced on filter cells.
pub const FILTER_ATTRS: [&str; 2] = ["data-filter-value", "data-full-text"];

/// Classes that mark a cell as a filter cell.
pub const FILTER_CELL_CLASSES: [&str; 4] =
    ["main-cell", "peer-cell", "destination-cell", "hour-datetime"];

/// Reusable parse buffer for freshly rendered cells.
#[derive(Debug, Default)]
pub struct ScratchCells {
    cells: Vec<Element>,
}

impl ScratchCells {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `html` into the buffer, replacing its previous contents.
    pub fn load(&mut self, html: &str) -> &[Element] {
        self.cells.clear();
        self.cells
            .extend(markup::parse_fragment(html).into_iter().filter_map(|node| match node {
                Node::Element(el) => Some(el),
                Node::Text(_) => None,
            }));
        &self.cells
    }
}

/// What [`apply_row_diff`] did to a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Markup identical to the cache; nothing written.
    Unchanged,
    /// Cells patched in place.
    Patched {
        /// Cells that received at least one write.
        cells_written: usize,
    },
    /// Row had no cells yet and was filled wholesale.
    Filled,
    /// Cell counts disagreed; the row was replaced wholesale.
    Replaced(ContractViolation),
}

impl PatchOutcome {
    /// Whether any cell content was written.
    pub fn wrote(&self) -> bool {
        match self {
            PatchOutcome::Unchanged => false,
            PatchOutcome::Patched { cells_written } => *cells_written > 0,
            PatchOutcome::Filled | PatchOutcome::Replaced(_) => true,
        }
    }
}

/// Bring `row` in line with `html`.
///
/// `cache` holds the markup last applied to this row and is updated to
/// `html`. When the rendered cell count differs from the row's, the row's
/// whole content is replaced instead of patched.
pub fn apply_row_diff<D: Dom>(
    dom: &mut D,
    row: &D::Node,
    cache: &mut Option<String>,
    html: &str,
    scratch: &mut ScratchCells,
) -> PatchOutcome {
    if cache.as_deref() == Some(html) {
        return PatchOutcome::Unchanged;
    }

    let rendered = scratch.load(html);
    let existing = dom.children(row);

    let outcome = if rendered.len() != existing.len() {
        dom.set_inner_html(row, html);
        if existing.is_empty() {
            PatchOutcome::Filled
        } else {
            PatchOutcome::Replaced(ContractViolation {
                rendered: rendered.len(),
                existing: existing.len(),
            })
        }
    } else {
        let cells_written = rendered
            .iter()
            .zip(&existing)
            .filter(|(src, dst)| sync_cell(dom, src, dst))
            .count();
        PatchOutcome::Patched { cells_written }
    };

    *cache = Some(html.to_string());
    outcome
}

/// Whether a cell's class list marks it as a filter cell.
pub fn is_filter_cell(class_name: &str) -> bool {
    class_name
        .split_ascii_whitespace()
        .any(|class| FILTER_CELL_CLASSES.contains(&class))
}

/// Sync one cell. Returns whether anything was written.
fn sync_cell<D: Dom>(dom: &mut D, src: &Element, dst: &D::Node) -> bool {
    let mut wrote = false;

    if dom.class_name(dst) != src.class_name() {
        dom.set_class_name(dst, src.class_name());
        wrote = true;
    }

    for attr in DATA_ATTRS {
        wrote |= sync_attr(dom, src, dst, attr);
    }

    if is_filter_cell(src.class_name()) {
        for attr in FILTER_ATTRS {
            wrote |= sync_attr(dom, src, dst, attr);
        }
    }

    let structured = src.child_element_count() > 0 || dom.child_element_count(dst) > 0;
    if structured {
        let html = src.inner_html();
        if dom.inner_html(dst) != html {
            dom.set_inner_html(dst, &html);
            wrote = true;
        }
    } else {
        let text = src.text_content();
        if dom.text_content(dst) != text {
            dom.set_text_content(dst, &text);
            wrote = true;
        }
    }

    wrote
}

/// Copy `attr` from `src` to `dst`, removing it when `src` lacks it.
fn sync_attr<D: Dom>(dom: &mut D, src: &Element, dst: &D::Node, attr: &str) -> bool {
    match src.attr(attr) {
        Some(value) if dom.attribute(dst, attr).as_deref() != Some(value) => {
            dom.set_attribute(dst, attr, value);
            true
        }
        Some(_) => false,
        None if dom.attribute(dst, attr).is_some() => {
            dom.remove_attribute(dst, attr);
            true
        }
        None => false,
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
