//! Error types for extract ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading a whole extract.
///
/// Problems confined to a single record never surface here; such records
/// are skipped and counted in [`crate::LoadedRows::skipped`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// Extract file not found.
    #[error("extract file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the extract.
    #[error("failed to read extract {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Header row is missing a required column.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Any other CSV failure that is not tied to one record.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// A source that is not file-backed failed to deliver rows.
    #[error("row source unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
