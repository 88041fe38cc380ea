//! Tests for the cell-level row diff.

use super::*;
use crate::dom::{MemoryDom, NodeId, WriteKind};

const TWO_CELLS: &str = r#"<td class="main-cell" data-filter-value="Acme" data-full-text="Acme">Acme</td><td class="metric-cell" data-pdd="1.5">1.5</td>"#;

struct Fixture {
    dom: MemoryDom,
    row: NodeId,
    cache: Option<String>,
    scratch: ScratchCells,
}

impl Fixture {
    fn new() -> Self {
        let mut dom = MemoryDom::new();
        let row = dom.create_row();
        Self {
            dom,
            row,
            cache: None,
            scratch: ScratchCells::new(),
        }
    }

    fn apply(&mut self, html: &str) -> PatchOutcome {
        apply_row_diff(
            &mut self.dom,
            &self.row,
            &mut self.cache,
            html,
            &mut self.scratch,
        )
    }

    fn cell(&self, index: usize) -> NodeId {
        self.dom.children(&self.row)[index]
    }
}

mod fill_and_cache {
    use super::*;

    #[test]
    fn empty_row_is_filled() {
        let mut fx = Fixture::new();
        assert_eq!(fx.apply(TWO_CELLS), PatchOutcome::Filled);
        assert_eq!(fx.dom.child_element_count(&fx.row), 2);
        assert_eq!(fx.cache.as_deref(), Some(TWO_CELLS));
    }

    #[test]
    fn identical_markup_writes_nothing() {
        let mut fx = Fixture::new();
        fx.apply(TWO_CELLS);
        fx.dom.clear_writes();

        assert_eq!(fx.apply(TWO_CELLS), PatchOutcome::Unchanged);
        assert!(fx.dom.writes().is_empty());
    }

    #[test]
    fn equivalent_markup_without_cache_writes_nothing_to_cells() {
        // Cache lost (e.g. fresh slot adopting an existing row): the per-cell
        // comparison still avoids writes when values already match.
        let mut fx = Fixture::new();
        fx.apply(TWO_CELLS);
        fx.cache = None;
        fx.dom.clear_writes();

        assert_eq!(fx.apply(TWO_CELLS), PatchOutcome::Patched { cells_written: 0 });
        assert!(fx.dom.writes().is_empty());
    }
}

mod cell_sync {
    use super::*;

    #[test]
    fn only_changed_cell_is_written() {
        let mut fx = Fixture::new();
        fx.apply(TWO_CELLS);
        let first = fx.cell(0);
        let second = fx.cell(1);
        fx.dom.clear_writes();

        let changed = TWO_CELLS.replace(">1.5<", ">2.0<");
        assert_eq!(fx.apply(&changed), PatchOutcome::Patched { cells_written: 1 });
        assert_eq!(fx.dom.writes_within(first), 0);
        assert_eq!(fx.dom.writes_within(second), 1);
        assert_eq!(fx.dom.count_writes(WriteKind::Text), 1);
        assert_eq!(fx.dom.text_content(&second), "2.0");
    }

    #[test]
    fn class_change_is_synced() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td class="a">x</td>"#);
        fx.dom.clear_writes();

        fx.apply(r#"<td class="b">x</td>"#);
        assert_eq!(fx.dom.class_name(&fx.cell(0)), "b");
        assert_eq!(fx.dom.count_writes(WriteKind::Class), 1);
        assert_eq!(fx.dom.count_writes(WriteKind::Text), 0);
    }

    #[test]
    fn whitelisted_data_attr_set_and_removed() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td data-pdd="1">x</td>"#);

        fx.apply(r#"<td data-pdd="2">x</td>"#);
        assert_eq!(fx.dom.attribute(&fx.cell(0), "data-pdd").as_deref(), Some("2"));

        fx.apply(r#"<td>x</td>"#);
        assert_eq!(fx.dom.attribute(&fx.cell(0), "data-pdd"), None);

        fx.apply(r#"<td data-y-toggleable="true">x</td>"#);
        assert_eq!(
            fx.dom.attribute(&fx.cell(0), "data-y-toggleable").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn attributes_outside_whitelist_are_ignored() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td title="a">x</td>"#);
        fx.dom.clear_writes();

        fx.apply(r#"<td title="b">x</td>"#);
        assert!(fx.dom.writes().is_empty());
        assert_eq!(fx.dom.attribute(&fx.cell(0), "title").as_deref(), Some("a"));
    }

    #[test]
    fn filter_attrs_only_on_filter_cells() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td class="peer-cell" data-full-text="A">A</td><td class="metric-cell" data-full-text="1">1</td>"#);

        fx.apply(r#"<td class="peer-cell" data-full-text="B">A</td><td class="metric-cell" data-full-text="2">1</td>"#);
        assert_eq!(
            fx.dom.attribute(&fx.cell(0), "data-full-text").as_deref(),
            Some("B")
        );
        assert_eq!(
            fx.dom.attribute(&fx.cell(1), "data-full-text").as_deref(),
            Some("1")
        );
    }

    #[test]
    fn nested_markup_uses_inner_html() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td><span class="badge">1</span></td>"#);
        fx.dom.clear_writes();

        fx.apply(r#"<td><span class="badge">2</span></td>"#);
        assert_eq!(fx.dom.count_writes(WriteKind::InnerHtml), 1);
        assert_eq!(fx.dom.inner_html(&fx.cell(0)), r#"<span class="badge">2</span>"#);
    }

    #[test]
    fn switching_from_nested_to_text_replaces_markup() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td><b>bold</b></td>"#);

        fx.apply(r#"<td>plain</td>"#);
        let cell = fx.cell(0);
        assert_eq!(fx.dom.child_element_count(&cell), 0);
        assert_eq!(fx.dom.text_content(&cell), "plain");
    }

    #[test]
    fn entities_compare_decoded() {
        let mut fx = Fixture::new();
        fx.apply(r#"<td>A &amp; B</td>"#);
        fx.dom.clear_writes();

        fx.cache = None;
        fx.apply(r#"<td>A &amp; B</td>"#);
        assert!(fx.dom.writes().is_empty());
        assert_eq!(fx.dom.text_content(&fx.cell(0)), "A & B");
    }
}

mod contract {
    use super::*;

    #[test]
    fn cell_count_mismatch_replaces_row() {
        let mut fx = Fixture::new();
        fx.apply(TWO_CELLS);
        fx.dom.clear_writes();

        let outcome = fx.apply(r#"<td>only</td>"#);
        assert_eq!(
            outcome,
            PatchOutcome::Replaced(ContractViolation {
                rendered: 1,
                existing: 2,
            })
        );
        assert_eq!(fx.dom.child_element_count(&fx.row), 1);
        assert_eq!(fx.dom.count_writes(WriteKind::InnerHtml), 1);
        assert!(outcome.wrote());
    }
}

#[test]
fn filter_cell_detection_checks_each_class() {
    assert!(is_filter_cell("main-cell"));
    assert!(is_filter_cell("truncate hour-datetime"));
    assert!(!is_filter_cell("metric-cell"));
    assert!(!is_filter_cell("main-cellular"));
    assert!(!is_filter_cell(""));
}

#[test]
fn scratch_buffer_is_reused() {
    let mut scratch = ScratchCells::new();
    assert_eq!(scratch.load("<td>a</td><td>b</td>").len(), 2);
    assert_eq!(scratch.load("<td>c</td>").len(), 1);
    assert_eq!(scratch.load("").len(), 0);
}
