//! Error types for the scroller.
//!
//! Nothing in the engine is fatal to the page. Initialization failures are
//! returned to the host, which falls back to non-virtualized rendering; render
//! contract violations are recovered in place and only surface as diagnostics.
//!
//! # Error Hierarchy
//!
//! - [`InitError`] - required DOM handle missing, or the scroller was destroyed
//! - [`ContractViolation`] - `render_row` output disagrees with the live row's cell count
//! - [`crate::dom::DomError`] - optional platform feature rejected (ignored)
//! - [`crate::config::ConfigError`] - configuration file or value problems

use std::fmt;
use thiserror::Error;

/// DOM handles the scroller requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    /// Scroll container element.
    Container,
    /// Element sized to the full virtual content height.
    Spacer,
    /// Row container (`tbody`).
    Tbody,
    /// Outer table element.
    Table,
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Handle::Container => "container",
            Handle::Spacer => "spacer",
            Handle::Tbody => "tbody",
            Handle::Table => "table",
        };
        f.write_str(name)
    }
}

/// Reasons `initialize()` can fail.
///
/// The scroller stays uninitialized after any of these; the host is expected
/// to render the table without virtualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    /// A required DOM handle was not supplied.
    #[error("missing required DOM handle: {0}")]
    MissingHandle(Handle),

    /// `destroy()` was already called; destruction is terminal.
    #[error("scroller has been destroyed")]
    Destroyed,
}

/// A row's rendered cell count did not match the existing row.
///
/// Recovered by replacing the row's entire inner content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell count mismatch: rendered {rendered} cells, row has {existing}")]
pub struct ContractViolation {
    /// Cells produced by `render_row`.
    pub rendered: usize,
    /// Cells present on the live row before patching.
    pub existing: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_handle_names_the_handle() {
        let err = InitError::MissingHandle(Handle::Spacer);
        assert_eq!(err.to_string(), "missing required DOM handle: spacer");
    }

    #[test]
    fn destroyed_display() {
        assert_eq!(InitError::Destroyed.to_string(), "scroller has been destroyed");
    }

    #[test]
    fn contract_violation_display() {
        let err = ContractViolation {
            rendered: 9,
            existing: 10,
        };
        assert_eq!(
            err.to_string(),
            "cell count mismatch: rendered 9 cells, row has 10"
        );
    }
}
