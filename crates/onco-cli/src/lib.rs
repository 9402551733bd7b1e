//! CLI library components for the accession reconciliation tool.

pub mod commands;
pub mod logging;
