//! Integration tests for file-backed extract loading.

use std::io::Write;

use onco_ingest::{CsvRowSource, IngestError, RowSource};
use onco_model::SourceRow;
use tempfile::NamedTempFile;

const HEADER: &str = "accession_identifier,tumor_identifier,diagnosis_date,icd10_code,icd10_version,body_side_code,diagnosis_certainty_code";

fn extract(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn loads_rows_from_file() {
    let file = extract(&[
        "A/2025/1234,1,2024-07-01,C00.0,10 2022 GM,L,2",
        "A25/7654,2,2024-01-01,C00.0,10 2022 GM,L,2",
    ]);
    let source = CsvRowSource::new(file.path());
    let loaded = source.load().unwrap();
    assert_eq!(loaded.skipped, 0);
    assert_eq!(
        loaded.rows,
        vec![
            SourceRow::new("A/2025/1234", "1", "2024-07-01", "C00.0", "10 2022 GM", "L", "2"),
            SourceRow::new("A25/7654", "2", "2024-01-01", "C00.0", "10 2022 GM", "L", "2"),
        ]
    );
}

#[test]
fn quoted_fields_and_empty_values() {
    let file = extract(&["\"A/2025/5, copy\",3,,C61,10 2022 GM,,"]);
    let loaded = CsvRowSource::new(file.path()).load().unwrap();
    assert_eq!(loaded.rows.len(), 1);
    let row = &loaded.rows[0];
    assert_eq!(row.accession_identifier, "A/2025/5, copy");
    assert_eq!(row.diagnosis_date, "");
    assert_eq!(row.body_side_code, "");
}

#[test]
fn missing_file_is_reported() {
    let source = CsvRowSource::new("/nonexistent/extract.csv");
    let err = source.load().unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
    assert!(err.to_string().contains("extract.csv"));
}

#[test]
fn in_memory_rows_are_a_source() {
    let rows = vec![SourceRow::new("A/25/1", "1", "", "", "", "", "")];
    let loaded = rows.load().unwrap();
    assert_eq!(loaded.rows, rows);
    assert_eq!(rows.describe(), "1 in-memory rows");
}
