//! CDR table row virtualization (cdrscroll)
//!
//! Windowed rendering engine for the hierarchical call-metrics table: only the
//! rows near the viewport are materialised, pooled row elements are reused
//! across scrolls, and each row is patched cell by cell instead of rebuilt.
//!
//! The engine is headless. It talks to the page through [`dom::Dom`];
//! [`dom::MemoryDom`] is the in-memory page used by tests, the benchmark and
//! the demo binary.

pub mod config;
pub mod dom;
pub mod logging;
pub mod model;
pub mod scroller;

pub use scroller::{DomHandles, ScrollerOptions, VirtualScroller};
