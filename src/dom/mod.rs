//! Host DOM abstraction.
//!
//! The scroller never touches a browser directly. Everything it needs from the
//! page (geometry, scroll events, animation frames, row elements and their
//! attributes) goes through [`Dom`]. A browser binding implements the trait on
//! top of real elements; [`MemoryDom`] implements it in memory for tests, the
//! benchmark and the demo binary.

pub mod markup;
pub mod memory;

pub use memory::{MemoryDom, NodeId, WriteKind, WriteRecord};

use std::fmt::Debug;
use thiserror::Error;

/// Errors raised by optional platform features.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The host does not support a style property.
    #[error("unsupported style property '{property}'")]
    Unsupported {
        /// The rejected property name.
        property: String,
    },
}

/// Source of scroll events the scroller subscribes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget<N> {
    /// A scrollable element (the scroll container).
    Element(N),
    /// The page viewport.
    Window,
}

/// Operations the scroller needs from its host page.
///
/// Geometry is in CSS pixels. Property reads are expected to be cheap; writes
/// may invalidate style or layout, which is why callers compare before
/// writing.
pub trait Dom {
    /// Handle to a live element.
    type Node: Clone + PartialEq + Debug;

    /// Monotonic timestamp in milliseconds.
    fn now_ms(&self) -> f64;

    /// Native scroll offset of a scrollable element.
    fn scroll_top(&self, node: &Self::Node) -> f64;
    /// Set the native scroll offset of a scrollable element.
    fn set_scroll_top(&mut self, node: &Self::Node, top: f64);
    /// Inner visible height of an element.
    fn client_height(&self, node: &Self::Node) -> f64;
    /// Full content height of an element.
    fn scroll_height(&self, node: &Self::Node) -> f64;
    /// Top edge of the element's bounding rect, relative to the viewport.
    fn bounding_top(&self, node: &Self::Node) -> f64;
    /// Height of the element's bounding rect.
    fn bounding_height(&self, node: &Self::Node) -> f64;
    /// Vertical scroll offset of the page.
    fn page_scroll_y(&self) -> f64;
    /// Scroll the page to an absolute offset.
    fn scroll_page_to(&mut self, top: f64);

    /// Start delivering scroll events from `target` to the scroller.
    fn listen_scroll(&mut self, target: ScrollTarget<Self::Node>);
    /// Stop delivering scroll events from `target`.
    fn unlisten_scroll(&mut self, target: ScrollTarget<Self::Node>);
    /// Ask for one animation-frame callback.
    fn request_animation_frame(&mut self);

    /// Create a detached, empty table row.
    fn create_row(&mut self) -> Self::Node;
    /// Parent of a node, if attached.
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
    /// Append several children at once.
    fn append_children(&mut self, parent: &Self::Node, children: &[Self::Node]) {
        for child in children {
            self.append_child(parent, child);
        }
    }
    /// Remove `child` from `parent`. No-op when it is not a child.
    fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
    /// Remove every child of `node`.
    fn clear_children(&mut self, node: &Self::Node);
    /// Element children of `node`, in order.
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;
    /// Number of element children.
    fn child_element_count(&self, node: &Self::Node) -> usize;

    /// Set an inline style property.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str)
        -> Result<(), DomError>;
    /// The `class` attribute.
    fn class_name(&self, node: &Self::Node) -> String;
    /// Replace the `class` attribute.
    fn set_class_name(&mut self, node: &Self::Node, class: &str);
    /// Read an attribute.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    /// Write an attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);
    /// Remove an attribute.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str);
    /// Concatenated descendant text.
    fn text_content(&self, node: &Self::Node) -> String;
    /// Replace all children with a single text node.
    fn set_text_content(&mut self, node: &Self::Node, text: &str);
    /// Serialised markup of the children.
    fn inner_html(&self, node: &Self::Node) -> String;
    /// Replace all children by parsing `html`.
    fn set_inner_html(&mut self, node: &Self::Node, html: &str);
}
