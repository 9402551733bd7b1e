//! Read and write the parts of ADT/GEKID report documents that diagnosis
//! enrichment touches.
//!
//! The document is held as a generic element tree so that content this
//! crate does not model survives a parse/write cycle.

#![deny(unsafe_code)]

pub mod dom;
pub mod error;
pub mod report;

pub use dom::{Element, Node};
pub use error::{DocumentError, Result};
pub use report::{DiagnosisEntry, EntityCounts, MessageLocation, ReportDocument};
