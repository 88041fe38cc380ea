//! Row element pool.
//!
//! Slots are position-indexed: during one render pass slot `i` holds data
//! index `window.start + i`. Nothing ties a slot to a data item across passes.

use crate::dom::Dom;

/// One pooled row element and the markup last patched into it.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSlot<N> {
    /// The row element.
    pub row: N,
    /// Markup last applied by the diff, compared byte-for-byte.
    pub last_markup: Option<String>,
    role_set: bool,
}

impl<N> PoolSlot<N> {
    fn new(row: N) -> Self {
        Self {
            row,
            last_markup: None,
            role_set: false,
        }
    }

    /// Returns `true` the first time only; the role attribute is written once.
    pub fn claim_role(&mut self) -> bool {
        !std::mem::replace(&mut self.role_set, true)
    }
}

/// Reusable row elements, grown on demand and trimmed past a cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RowPool<N> {
    slots: Vec<PoolSlot<N>>,
}

impl<N> Default for RowPool<N> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<N: Clone + PartialEq> RowPool<N> {
    /// Empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot at `index`.
    pub fn slot(&self, index: usize) -> Option<&PoolSlot<N>> {
        self.slots.get(index)
    }

    /// Mutable slot at `index`.
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut PoolSlot<N>> {
        self.slots.get_mut(index)
    }

    /// All slots, in order.
    pub fn slots(&self) -> &[PoolSlot<N>] {
        &self.slots
    }

    /// Create empty detached rows until there are at least `needed` slots.
    ///
    /// Returns how many were created.
    pub fn ensure<D: Dom<Node = N>>(&mut self, dom: &mut D, needed: usize) -> usize {
        let missing = needed.saturating_sub(self.slots.len());
        self.slots.reserve(missing);
        for _ in 0..missing {
            self.slots.push(PoolSlot::new(dom.create_row()));
        }
        missing
    }

    /// Detach every slot at index `>= needed` that is attached to `parent`.
    ///
    /// Detached slots stay in the pool with their cached markup. Returns how
    /// many were detached.
    pub fn detach_extra<D: Dom<Node = N>>(&mut self, dom: &mut D, parent: &N, needed: usize) -> usize {
        let mut detached = 0;
        for slot in self.slots.iter().skip(needed).rev() {
            if dom.parent(&slot.row).as_ref() == Some(parent) {
                dom.remove_child(parent, &slot.row);
                detached += 1;
            }
        }
        detached
    }

    /// Drop slots beyond `max(needed, cap)` when the pool exceeds `cap`.
    ///
    /// Dropped rows still attached to `parent` are removed from it first.
    /// Returns how many slots were dropped.
    pub fn trim<D: Dom<Node = N>>(
        &mut self,
        dom: &mut D,
        parent: &N,
        cap: usize,
        needed: usize,
    ) -> usize {
        if self.slots.len() <= cap {
            return 0;
        }
        let target = needed.max(cap);
        let mut dropped = 0;
        while self.slots.len() > target {
            if let Some(slot) = self.slots.pop() {
                if dom.parent(&slot.row).as_ref() == Some(parent) {
                    dom.remove_child(parent, &slot.row);
                }
                dropped += 1;
            }
        }
        dropped
    }
}

/// Pool capacity: `max(needed, ceil(visible_rows × screens_cap))`.
pub fn pool_cap(needed: usize, visible_rows: usize, screens_cap: u32) -> usize {
    needed.max(visible_rows.saturating_mul(screens_cap as usize))
}
