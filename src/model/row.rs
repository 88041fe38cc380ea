//! Row descriptors as seen by the scroller.
//!
//! Rows are host records. The engine reads four fields from them (kind,
//! level, group id, parent id) and hands the whole record to the host's row
//! renderer.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Position of a row in the main/peer/hourly hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Top-level aggregate row.
    Main,
    /// Per-peer breakdown under a main row.
    Peer,
    /// Per-hour breakdown under a peer row.
    Hourly,
}

impl RowKind {
    /// Wire name (`main`, `peer`, `hourly`).
    pub fn as_str(&self) -> &'static str {
        match self {
            RowKind::Main => "main",
            RowKind::Peer => "peer",
            RowKind::Hourly => "hourly",
        }
    }

    /// CSS class applied to rows of this kind.
    pub fn row_class(&self) -> &'static str {
        match self {
            RowKind::Main => "main-row",
            RowKind::Peer => "peer-row",
            RowKind::Hourly => "hour-row",
        }
    }

    /// Hierarchy level (0, 1, 2).
    pub fn level(&self) -> u8 {
        match self {
            RowKind::Main => 0,
            RowKind::Peer => 1,
            RowKind::Hourly => 2,
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised row kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown row kind '{0}' (expected main, peer or hourly)")]
pub struct UnknownRowKind(pub String);

impl FromStr for RowKind {
    type Err = UnknownRowKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(RowKind::Main),
            "peer" => Ok(RowKind::Peer),
            "hourly" => Ok(RowKind::Hourly),
            other => Err(UnknownRowKind(other.to_string())),
        }
    }
}

/// Fields the scroller reads from a host row.
pub trait RowRecord {
    /// Row type, if the record carries one.
    fn kind(&self) -> Option<RowKind>;

    /// Hierarchy level, if the record carries one.
    fn level(&self) -> Option<u8>;

    /// Stable key of the logical row.
    fn group_id(&self) -> Option<&str>;

    /// Key of the logical parent row.
    fn parent_id(&self) -> Option<&str>;
}

/// CSS class for a row element.
///
/// Level takes precedence within each tier, then type: level 0 or `main`
/// gives `main-row`, level 1 or `peer` gives `peer-row`, level 2 or `hourly`
/// gives `hour-row`. Anything else gets no class.
pub fn row_class<R: RowRecord + ?Sized>(row: &R) -> &'static str {
    match (row.level(), row.kind()) {
        (Some(0), _) | (_, Some(RowKind::Main)) => RowKind::Main.row_class(),
        (Some(1), _) | (_, Some(RowKind::Peer)) => RowKind::Peer.row_class(),
        (Some(2), _) | (_, Some(RowKind::Hourly)) => RowKind::Hourly.row_class(),
        _ => "",
    }
}

/// Value of a row element's `data-key`.
///
/// The group id when present and non-empty, otherwise `"{type}-{index}"`
/// (with `row` standing in for a missing type).
pub fn data_key<R: RowRecord + ?Sized>(row: &R, index: usize) -> Cow<'_, str> {
    match row.group_id() {
        Some(id) if !id.is_empty() => Cow::Borrowed(id),
        _ => {
            let kind = row.kind().map_or("row", |k| k.as_str());
            Cow::Owned(format!("{}-{}", kind, index))
        }
    }
}

/// Row counts by kind, for render diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowTypeCounts {
    /// Main rows.
    pub main: usize,
    /// Peer rows.
    pub peer: usize,
    /// Hourly rows.
    pub hourly: usize,
    /// Rows without a type.
    pub unknown: usize,
}

impl RowTypeCounts {
    /// Count the kinds in a slice of rows.
    pub fn tally<R: RowRecord>(rows: &[R]) -> Self {
        rows.iter().fold(Self::default(), |mut counts, row| {
            match row.kind() {
                Some(RowKind::Main) => counts.main += 1,
                Some(RowKind::Peer) => counts.peer += 1,
                Some(RowKind::Hourly) => counts.hourly += 1,
                None => counts.unknown += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        kind: Option<RowKind>,
        level: Option<u8>,
        group: Option<&'static str>,
    }

    impl RowRecord for Stub {
        fn kind(&self) -> Option<RowKind> {
            self.kind
        }
        fn level(&self) -> Option<u8> {
            self.level
        }
        fn group_id(&self) -> Option<&str> {
            self.group
        }
        fn parent_id(&self) -> Option<&str> {
            None
        }
    }

    fn stub(kind: Option<RowKind>, level: Option<u8>) -> Stub {
        Stub {
            kind,
            level,
            group: None,
        }
    }

    #[test]
    fn class_from_type() {
        assert_eq!(row_class(&stub(Some(RowKind::Main), None)), "main-row");
        assert_eq!(row_class(&stub(Some(RowKind::Peer), None)), "peer-row");
        assert_eq!(row_class(&stub(Some(RowKind::Hourly), None)), "hour-row");
    }

    #[test]
    fn class_from_level() {
        assert_eq!(row_class(&stub(None, Some(0))), "main-row");
        assert_eq!(row_class(&stub(None, Some(1))), "peer-row");
        assert_eq!(row_class(&stub(None, Some(2))), "hour-row");
    }

    #[test]
    fn main_tier_wins_over_lower_tiers() {
        assert_eq!(row_class(&stub(Some(RowKind::Main), Some(2))), "main-row");
        assert_eq!(row_class(&stub(Some(RowKind::Hourly), Some(1))), "peer-row");
    }

    #[test]
    fn class_empty_without_hierarchy() {
        assert_eq!(row_class(&stub(None, None)), "");
        assert_eq!(row_class(&stub(None, Some(7))), "");
    }

    #[test]
    fn data_key_prefers_group_id() {
        let row = Stub {
            kind: Some(RowKind::Peer),
            level: None,
            group: Some("g-42"),
        };
        assert_eq!(data_key(&row, 3), "g-42");
    }

    #[test]
    fn data_key_falls_back_to_type_and_index() {
        assert_eq!(data_key(&stub(Some(RowKind::Hourly), None), 17), "hourly-17");
        assert_eq!(data_key(&stub(None, None), 4), "row-4");

        let empty_group = Stub {
            kind: Some(RowKind::Main),
            level: None,
            group: Some(""),
        };
        assert_eq!(data_key(&empty_group, 0), "main-0");
    }

    #[test]
    fn kind_parses_wire_names() {
        assert_eq!("peer".parse::<RowKind>(), Ok(RowKind::Peer));
        assert!("hour".parse::<RowKind>().is_err());
    }

    #[test]
    fn tally_counts_each_kind() {
        let rows = vec![
            stub(Some(RowKind::Main), None),
            stub(Some(RowKind::Peer), None),
            stub(Some(RowKind::Peer), None),
            stub(None, Some(2)),
        ];
        let counts = RowTypeCounts::tally(&rows);
        assert_eq!(
            counts,
            RowTypeCounts {
                main: 1,
                peer: 2,
                hourly: 0,
                unknown: 1
            }
        );
    }
}
