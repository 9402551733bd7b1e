//! Accession reconciliation against the clinical database extract.
//!
//! - [`index`]: exact-match index over rows with a unique accession number
//! - [`shared`]: process-wide holder with atomic replacement
//! - [`refresh`]: periodic and triggered rebuilds
//! - [`merge`]: filling diagnosis gaps from a matched row

#![deny(unsafe_code)]

pub mod datetime;
pub mod index;
pub mod merge;
pub mod refresh;
pub mod shared;

pub use datetime::{parse_iso_date, to_report_date};
pub use index::{BuildStats, ReconciliationIndex};
pub use merge::{DiagnosisField, MergeFinding, MergeReport, merge_diagnosis};
pub use refresh::IndexRefresher;
pub use shared::SharedIndex;
