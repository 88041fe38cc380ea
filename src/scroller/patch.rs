//! Syncing one pooled row with one data row.

use super::diff::{apply_row_diff, PatchOutcome, ScratchCells};
use super::pool::PoolSlot;
use super::{Lifecycle, RenderRowFn, VirtualScroller};
use crate::dom::Dom;
use crate::logging::RENDER_TARGET;
use crate::model::{data_key, row_class, RowRecord};
use tracing::debug;

/// Bring `slot` in line with data row `index`: row attributes first, then
/// the cells through the diff.
pub(super) fn sync_row<D: Dom, R: RowRecord>(
    dom: &mut D,
    slot: &mut PoolSlot<D::Node>,
    row: &R,
    index: usize,
    render_row: &RenderRowFn<R>,
    scratch: &mut ScratchCells,
) -> PatchOutcome {
    sync_row_attributes(dom, slot, row, index);
    let html = render_row(row);
    apply_row_diff(dom, &slot.row, &mut slot.last_markup, &html, scratch)
}

/// Class, role, `data-key`, `data-virtual-index` and `data-group`, each
/// written only when it differs.
fn sync_row_attributes<D: Dom, R: RowRecord>(
    dom: &mut D,
    slot: &mut PoolSlot<D::Node>,
    row: &R,
    index: usize,
) {
    let class = row_class(row);
    if dom.class_name(&slot.row) != class {
        dom.set_class_name(&slot.row, class);
    }
    if slot.claim_role() {
        dom.set_attribute(&slot.row, "role", "row");
    }
    sync_attribute(dom, &slot.row, "data-key", &data_key(row, index));
    sync_attribute(dom, &slot.row, "data-virtual-index", &index.to_string());
    sync_attribute(dom, &slot.row, "data-group", row.parent_id().unwrap_or(""));
}

fn sync_attribute<D: Dom>(dom: &mut D, node: &D::Node, name: &str, value: &str) {
    if dom.attribute(node, name).as_deref() != Some(value) {
        dom.set_attribute(node, name, value);
    }
}

/// Log a contract violation when debugging.
pub(super) fn report_outcome(outcome: &PatchOutcome, index: usize, debug: bool) {
    if let (true, PatchOutcome::Replaced(violation)) = (debug, outcome) {
        debug!(
            target: RENDER_TARGET,
            index,
            rendered = violation.rendered,
            existing = violation.existing,
            "{violation}; row replaced"
        );
    }
}

impl<D: Dom, R: RowRecord> VirtualScroller<D, R> {
    /// Re-patch data row `index` in place if it is materialised.
    pub(super) fn patch_row_at(&mut self, index: usize) -> bool {
        if self.lifecycle != Lifecycle::Initialized {
            return false;
        }
        let Some(row) = self.data.get(index) else {
            return false;
        };
        let Some(slot_index) = self.window.and_then(|w| w.slot_of(index)) else {
            return false;
        };
        let Some(slot) = self.pool.slot_mut(slot_index) else {
            return false;
        };

        let outcome = sync_row(
            &mut self.dom,
            slot,
            row,
            index,
            &self.render_row,
            &mut self.scratch,
        );
        report_outcome(&outcome, index, self.config.debug);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryDom, NodeId, WriteKind};
    use crate::model::{CdrRow, RowKind};

    fn render(row: &CdrRow) -> String {
        row.default_markup()
    }

    fn fixture() -> (MemoryDom, PoolSlot<NodeId>, ScratchCells, RenderRowFn<CdrRow>) {
        let mut dom = MemoryDom::new();
        let mut pool = super::super::RowPool::new();
        pool.ensure(&mut dom, 1);
        let slot = pool.slots()[0].clone();
        let render_row: RenderRowFn<CdrRow> = Box::new(render);
        (dom, slot, ScratchCells::new(), render_row)
    }

    fn peer(name: &str) -> CdrRow {
        CdrRow {
            kind: Some(RowKind::Peer),
            group_id: Some(format!("peer:{name}")),
            parent_id: Some("main:acme".into()),
            peer: name.into(),
            ..CdrRow::default()
        }
    }

    #[test]
    fn first_sync_sets_row_attributes() {
        let (mut dom, mut slot, mut scratch, render_row) = fixture();
        sync_row(&mut dom, &mut slot, &peer("carrier"), 7, &render_row, &mut scratch);

        assert_eq!(dom.class_name(&slot.row), "peer-row");
        assert_eq!(dom.attribute(&slot.row, "role").as_deref(), Some("row"));
        assert_eq!(dom.attribute(&slot.row, "data-key").as_deref(), Some("peer:carrier"));
        assert_eq!(dom.attribute(&slot.row, "data-virtual-index").as_deref(), Some("7"));
        assert_eq!(dom.attribute(&slot.row, "data-group").as_deref(), Some("main:acme"));
    }

    #[test]
    fn resync_of_same_row_writes_nothing() {
        let (mut dom, mut slot, mut scratch, render_row) = fixture();
        let row = peer("carrier");
        sync_row(&mut dom, &mut slot, &row, 7, &render_row, &mut scratch);
        dom.clear_writes();

        let outcome = sync_row(&mut dom, &mut slot, &row, 7, &render_row, &mut scratch);
        assert_eq!(outcome, PatchOutcome::Unchanged);
        assert!(dom.writes().is_empty());
    }

    #[test]
    fn role_is_written_once() {
        let (mut dom, mut slot, mut scratch, render_row) = fixture();
        sync_row(&mut dom, &mut slot, &peer("a"), 0, &render_row, &mut scratch);
        dom.remove_attribute(&slot.row, "role");
        dom.clear_writes();

        sync_row(&mut dom, &mut slot, &peer("b"), 1, &render_row, &mut scratch);
        assert_eq!(dom.attribute(&slot.row, "role"), None);
    }

    #[test]
    fn moved_slot_only_updates_changed_attributes() {
        let (mut dom, mut slot, mut scratch, render_row) = fixture();
        sync_row(&mut dom, &mut slot, &peer("a"), 3, &render_row, &mut scratch);
        dom.clear_writes();

        sync_row(&mut dom, &mut slot, &peer("b"), 4, &render_row, &mut scratch);
        let row_writes: Vec<_> = dom
            .writes()
            .iter()
            .filter(|w| w.node == slot.row)
            .map(|w| w.kind)
            .collect();
        // data-key and data-virtual-index; class and data-group unchanged.
        assert_eq!(row_writes, [WriteKind::Attribute, WriteKind::Attribute]);
    }
}
