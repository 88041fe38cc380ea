//! Domain model types (pure).
//!
//! Row descriptors the scroller reads, the concrete CDR row used by the
//! dashboard, and the error taxonomy.

pub mod cdr_row;
pub mod error;
pub mod row;

pub use cdr_row::{sample_hierarchy, CdrRow, CDR_COLUMN_COUNT};
pub use error::{ContractViolation, Handle, InitError};
pub use row::{data_key, row_class, RowKind, RowRecord, RowTypeCounts, UnknownRowKind};
