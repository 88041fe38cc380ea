//! In-memory [`Dom`] implementation.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Geometry is
//! simulated: elements carry a client height, an optional content height, a
//! document-relative top, and a native scroll offset; attached `<tr>` rows
//! report a configurable rendered height. Every mutating call is appended to a
//! write log so tests can assert on exactly which nodes were touched.

use super::markup::{self, Element, Node};
use super::{Dom, DomError, ScrollTarget};
use crate::scroller::DomHandles;
use std::collections::{BTreeMap, BTreeSet};

/// Rendered row height reported for attached rows until told otherwise.
pub const DEFAULT_RENDERED_ROW_HEIGHT: f64 = 40.0;

/// Arena index of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Category of a recorded DOM write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKind {
    /// `className` assignment.
    Class,
    /// Attribute set or removal.
    Attribute,
    /// `textContent` assignment.
    Text,
    /// `innerHTML` assignment (including clearing).
    InnerHtml,
    /// Inline style assignment.
    Style,
    /// Node inserted into a parent.
    Attach,
    /// Node removed from a parent.
    Detach,
}

/// One recorded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    /// Node written to.
    pub node: NodeId,
    /// What was written.
    pub kind: WriteKind,
    /// Ancestors of `node` at write time, nearest first.
    pub ancestors: Vec<NodeId>,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    attrs: Vec<(String, String)>,
    style: BTreeMap<String, String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    scroll_top: f64,
    client_height: f64,
    scroll_height: Option<f64>,
    layout_top: f64,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            style: BTreeMap::new(),
            children: Vec::new(),
            parent: None,
            scroll_top: 0.0,
            client_height: 0.0,
            scroll_height: None,
            layout_top: 0.0,
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            NodeKind::Text(_) => None,
        }
    }
}

/// In-memory page model.
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<NodeData>,
    free: Vec<usize>,
    now: f64,
    page_scroll_y: f64,
    rendered_row_height: f64,
    listeners: Vec<ScrollTarget<NodeId>>,
    frame_requests: usize,
    unsupported: BTreeSet<String>,
    writes: Vec<WriteRecord>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create an empty page.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            now: 0.0,
            page_scroll_y: 0.0,
            rendered_row_height: DEFAULT_RENDERED_ROW_HEIGHT,
            listeners: Vec::new(),
            frame_requests: 0,
            unsupported: BTreeSet::new(),
            writes: Vec::new(),
        }
    }

    /// Build the standard virtual table layout.
    ///
    /// ```text
    /// div.scroll-container (client height = viewport_height, overflowing)
    /// ├── div.spacer
    /// └── table
    ///     └── tbody
    /// ```
    ///
    /// The container reports content taller than itself, so the scroller
    /// resolves container-scroll mode. Shrink it with [`set_scroll_height`]
    /// before initialising to exercise page-scroll fallback.
    ///
    /// [`set_scroll_height`]: MemoryDom::set_scroll_height
    pub fn table_fixture(viewport_height: f64) -> (Self, DomHandles<NodeId>) {
        let mut dom = Self::new();
        let container = dom.create_element("div");
        let spacer = dom.create_element("div");
        let table = dom.create_element("table");
        let tbody = dom.create_element("tbody");

        dom.raw_append(container, spacer);
        dom.raw_append(container, table);
        dom.raw_append(table, tbody);

        dom.set_client_height(container, viewport_height);
        dom.set_scroll_height(container, f64::MAX);
        dom.set_attr_raw(container, "class", "scroll-container");
        dom.set_attr_raw(spacer, "class", "spacer");

        let handles = DomHandles {
            container: Some(container),
            spacer: Some(spacer),
            tbody: Some(tbody),
            table: Some(table),
        };
        (dom, handles)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(tag.to_ascii_lowercase()))
    }

    /// Tag name of an element; `None` for text nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).and_then(NodeData::tag)
    }

    /// Inline style value.
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|n| n.style.get(property))
            .map(String::as_str)
    }

    /// Inline style value parsed as pixels (`"40000px"` → `40000.0`).
    pub fn style_px(&self, node: NodeId, property: &str) -> Option<f64> {
        self.style(node, property)?
            .trim()
            .strip_suffix("px")?
            .trim()
            .parse()
            .ok()
    }

    /// Serialised markup of the element itself, including its own tag.
    pub fn outer_html(&self, node: NodeId) -> String {
        markup::serialize(&[self.to_markup(node)])
    }

    /// Set an element's visible height.
    pub fn set_client_height(&mut self, node: NodeId, height: f64) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.client_height = height;
        }
    }

    /// Set an element's content height.
    pub fn set_scroll_height(&mut self, node: NodeId, height: f64) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.scroll_height = Some(height);
        }
    }

    /// Set an element's document-relative top edge.
    pub fn set_layout_top(&mut self, node: NodeId, top: f64) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.layout_top = top;
        }
    }

    /// Height reported by `bounding_height` for attached rows.
    pub fn set_rendered_row_height(&mut self, height: f64) {
        self.rendered_row_height = height;
    }

    /// Set the clock.
    pub fn set_clock(&mut self, now_ms: f64) {
        self.now = now_ms;
    }

    /// Move the clock forward.
    pub fn advance_clock(&mut self, ms: f64) {
        self.now += ms;
    }

    /// Make `set_style` reject a property.
    pub fn mark_unsupported(&mut self, property: &str) {
        self.unsupported.insert(property.to_string());
    }

    /// Currently registered scroll listeners.
    pub fn listeners(&self) -> &[ScrollTarget<NodeId>] {
        &self.listeners
    }

    /// Whether a listener is registered for `target`.
    pub fn is_listening(&self, target: &ScrollTarget<NodeId>) -> bool {
        self.listeners.contains(target)
    }

    /// Number of animation frames requested since the last take.
    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    /// Consume pending frame requests; returns whether any were pending.
    pub fn take_frame_request(&mut self) -> bool {
        let pending = self.frame_requests > 0;
        self.frame_requests = 0;
        pending
    }

    /// All recorded writes, oldest first.
    pub fn writes(&self) -> &[WriteRecord] {
        &self.writes
    }

    /// Forget recorded writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Count writes of one kind.
    pub fn count_writes(&self, kind: WriteKind) -> usize {
        self.writes.iter().filter(|w| w.kind == kind).count()
    }

    /// Count writes to `root` or any node that was below it at write time.
    pub fn writes_within(&self, root: NodeId) -> usize {
        self.writes
            .iter()
            .filter(|w| w.node == root || w.ancestors.contains(&root))
            .count()
    }

    /// Nodes currently allocated in the arena, attached or not.
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = NodeData::new(kind);
                NodeId(slot)
            }
            None => {
                self.nodes.push(NodeData::new(kind));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Return `node` and its descendants to the free list.
    fn release(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let data = &mut self.nodes[id.0];
            data.parent = None;
            data.attrs.clear();
            data.style.clear();
            stack.append(&mut data.children);
            self.free.push(id.0);
        }
    }

    /// Drop the content of `node`. Replaced content has no handle outside
    /// the arena, so its slots are reused.
    fn replace_content(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.release(child);
        }
    }

    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.nodes.get(node.0).and_then(|n| n.parent);
        while let Some(parent) = cursor {
            chain.push(parent);
            cursor = self.nodes[parent.0].parent;
        }
        chain
    }

    fn record(&mut self, node: NodeId, kind: WriteKind) {
        let ancestors = self.ancestors(node);
        self.writes.push(WriteRecord {
            node,
            kind,
            ancestors,
        });
    }

    fn raw_append(&mut self, parent: NodeId, child: NodeId) {
        self.raw_detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn raw_detach(&mut self, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
    }

    fn raw_clear(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn set_attr_raw(&mut self, node: NodeId, name: &str, value: &str) {
        let attrs = &mut self.nodes[node.0].attrs;
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn build(&mut self, node: &Node) -> NodeId {
        match node {
            Node::Text(text) => self.alloc(NodeKind::Text(text.clone())),
            Node::Element(el) => {
                let id = self.alloc(NodeKind::Element(el.tag.clone()));
                self.nodes[id.0].attrs = el.attrs.clone();
                for child in &el.children {
                    let child_id = self.build(child);
                    self.raw_append(id, child_id);
                }
                id
            }
        }
    }

    fn to_markup(&self, node: NodeId) -> Node {
        let data = &self.nodes[node.0];
        match &data.kind {
            NodeKind::Text(text) => Node::Text(text.clone()),
            NodeKind::Element(tag) => Node::Element(Element {
                tag: tag.clone(),
                attrs: data.attrs.clone(),
                children: data.children.iter().map(|&c| self.to_markup(c)).collect(),
            }),
        }
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let data = &self.nodes[node.0];
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(_) => {
                for &child in &data.children {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn now_ms(&self) -> f64 {
        self.now
    }

    fn scroll_top(&self, node: &NodeId) -> f64 {
        self.nodes.get(node.0).map_or(0.0, |n| n.scroll_top)
    }

    fn set_scroll_top(&mut self, node: &NodeId, top: f64) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.scroll_top = top.max(0.0);
        }
    }

    fn client_height(&self, node: &NodeId) -> f64 {
        self.nodes.get(node.0).map_or(0.0, |n| n.client_height)
    }

    fn scroll_height(&self, node: &NodeId) -> f64 {
        self.nodes
            .get(node.0)
            .map_or(0.0, |n| n.scroll_height.unwrap_or(n.client_height))
    }

    fn bounding_top(&self, node: &NodeId) -> f64 {
        self.nodes
            .get(node.0)
            .map_or(0.0, |n| n.layout_top - self.page_scroll_y)
    }

    fn bounding_height(&self, node: &NodeId) -> f64 {
        let Some(data) = self.nodes.get(node.0) else {
            return 0.0;
        };
        match data.tag() {
            Some("tr") if data.parent.is_some() => self.rendered_row_height,
            Some("tr") => 0.0,
            _ => data.client_height,
        }
    }

    fn page_scroll_y(&self) -> f64 {
        self.page_scroll_y
    }

    fn scroll_page_to(&mut self, top: f64) {
        self.page_scroll_y = top.max(0.0);
    }

    fn listen_scroll(&mut self, target: ScrollTarget<NodeId>) {
        if !self.listeners.contains(&target) {
            self.listeners.push(target);
        }
    }

    fn unlisten_scroll(&mut self, target: ScrollTarget<NodeId>) {
        self.listeners.retain(|t| *t != target);
    }

    fn request_animation_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn create_row(&mut self) -> NodeId {
        self.create_element("tr")
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
        self.raw_append(*parent, *child);
        self.record(*child, WriteKind::Attach);
    }

    fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
        if self.nodes[child.0].parent != Some(*parent) {
            return;
        }
        self.record(*child, WriteKind::Detach);
        self.raw_detach(*child);
    }

    fn clear_children(&mut self, node: &NodeId) {
        self.record(*node, WriteKind::InnerHtml);
        self.raw_clear(*node);
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes.get(node.0).map_or_else(Vec::new, |n| {
            n.children
                .iter()
                .copied()
                .filter(|c| self.nodes[c.0].is_element())
                .collect()
        })
    }

    fn child_element_count(&self, node: &NodeId) -> usize {
        self.nodes.get(node.0).map_or(0, |n| {
            n.children
                .iter()
                .filter(|c| self.nodes[c.0].is_element())
                .count()
        })
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        if self.unsupported.contains(property) {
            return Err(DomError::Unsupported {
                property: property.to_string(),
            });
        }
        self.nodes[node.0]
            .style
            .insert(property.to_string(), value.to_string());
        self.record(*node, WriteKind::Style);
        Ok(())
    }

    fn class_name(&self, node: &NodeId) -> String {
        self.attribute(node, "class").unwrap_or_default()
    }

    fn set_class_name(&mut self, node: &NodeId, class: &str) {
        self.set_attr_raw(*node, "class", class);
        self.record(*node, WriteKind::Class);
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.nodes.get(node.0).and_then(|n| {
            n.attrs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        })
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.set_attr_raw(*node, name, value);
        self.record(*node, WriteKind::Attribute);
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) {
        self.nodes[node.0].attrs.retain(|(key, _)| key != name);
        self.record(*node, WriteKind::Attribute);
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        if self.nodes.get(node.0).is_some() {
            self.collect_text(*node, &mut out);
        }
        out
    }

    fn set_text_content(&mut self, node: &NodeId, text: &str) {
        self.record(*node, WriteKind::Text);
        self.replace_content(*node);
        if !text.is_empty() {
            let text_node = self.alloc(NodeKind::Text(text.to_string()));
            self.raw_append(*node, text_node);
        }
    }

    fn inner_html(&self, node: &NodeId) -> String {
        self.nodes.get(node.0).map_or_else(String::new, |n| {
            let children: Vec<Node> = n.children.iter().map(|&c| self.to_markup(c)).collect();
            markup::serialize(&children)
        })
    }

    fn set_inner_html(&mut self, node: &NodeId, html: &str) {
        self.record(*node, WriteKind::InnerHtml);
        self.replace_content(*node);
        for parsed in markup::parse_fragment(html) {
            let child = self.build(&parsed);
            self.raw_append(*node, child);
        }
    }
}
