//! Bulk row loading for the reconciliation index.
//!
//! The index is rebuilt from a full extract of the clinical database. This
//! crate turns that extract into [`SourceRow`](onco_model::SourceRow)s and
//! defines the [`RowSource`] seam so the index can be refreshed from any
//! backing store.

pub mod csv;
pub mod error;
pub mod source;

pub use crate::csv::{CsvRowSource, REQUIRED_COLUMNS, read_rows};
pub use error::{IngestError, Result};
pub use source::{LoadedRows, RowSource};
