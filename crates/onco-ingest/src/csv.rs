//! CSV extract reading.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use onco_model::SourceRow;

use crate::error::{IngestError, Result};
use crate::source::{LoadedRows, RowSource};

/// Header names every extract must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "accession_identifier",
    "tumor_identifier",
    "diagnosis_date",
    "icd10_code",
    "icd10_version",
    "body_side_code",
    "diagnosis_certainty_code",
];

/// A CSV file exported from the clinical database.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for CsvRowSource {
    fn load(&self) -> Result<LoadedRows> {
        if !self.path.exists() {
            return Err(IngestError::FileNotFound {
                path: self.path.clone(),
            });
        }
        let file = File::open(&self.path).map_err(|source| IngestError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        read_rows(file, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read extract rows from any reader.
///
/// Values are taken as-is (no trimming) so that the accession normalizer
/// sees the raw text. Records that cannot be deserialized are skipped; I/O
/// failures abort the load.
pub fn read_rows<R: Read>(reader: R, path: &Path) -> Result<LoadedRows> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    check_headers(&headers, path)?;

    let mut loaded = LoadedRows::default();
    for (index, record) in csv_reader.deserialize::<SourceRow>().enumerate() {
        match record {
            Ok(row) => loaded.rows.push(row),
            Err(error) if error.is_io_error() => return Err(csv_error(path, error)),
            Err(error) => {
                // Line numbers only: record content may identify patients.
                let line = error.position().map_or(index as u64 + 2, |p| p.line());
                debug!(line, "skipping malformed extract record: {}", record_error_label(&error));
                loaded.skipped += 1;
            }
        }
    }

    if loaded.skipped > 0 {
        warn!(
            path = %path.display(),
            skipped = loaded.skipped,
            "skipped malformed extract records"
        );
    }
    info!(
        path = %path.display(),
        rows = loaded.rows.len(),
        "loaded extract rows"
    );
    Ok(loaded)
}

fn check_headers(headers: &StringRecord, path: &Path) -> Result<()> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(IngestError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

fn csv_error(path: &Path, error: ::csv::Error) -> IngestError {
    if error.is_io_error() {
        if let ::csv::ErrorKind::Io(io) = error.into_kind() {
            return IngestError::FileRead {
                path: path.to_path_buf(),
                source: io,
            };
        }
        return IngestError::CsvParse {
            path: path.to_path_buf(),
            message: "I/O error".to_string(),
        };
    }
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn record_error_label(error: &::csv::Error) -> &'static str {
    match error.kind() {
        ::csv::ErrorKind::Utf8 { .. } => "invalid UTF-8",
        ::csv::ErrorKind::UnequalLengths { .. } => "unexpected field count",
        ::csv::ErrorKind::Deserialize { .. } => "field could not be read",
        _ => "unreadable record",
    }
}
