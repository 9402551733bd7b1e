//! Rows from the clinical database extract.

use serde::{Deserialize, Serialize};

use crate::ids::CanonicalIdentifier;

/// One raw row as delivered by the bulk data source.
///
/// Field names match the column headers of the extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    pub accession_identifier: String,
    pub tumor_identifier: String,
    pub diagnosis_date: String,
    pub icd10_code: String,
    pub icd10_version: String,
    pub body_side_code: String,
    pub diagnosis_certainty_code: String,
}

impl SourceRow {
    pub fn new(
        accession_identifier: impl Into<String>,
        tumor_identifier: impl Into<String>,
        diagnosis_date: impl Into<String>,
        icd10_code: impl Into<String>,
        icd10_version: impl Into<String>,
        body_side_code: impl Into<String>,
        diagnosis_certainty_code: impl Into<String>,
    ) -> Self {
        Self {
            accession_identifier: accession_identifier.into(),
            tumor_identifier: tumor_identifier.into(),
            diagnosis_date: diagnosis_date.into(),
            icd10_code: icd10_code.into(),
            icd10_version: icd10_version.into(),
            body_side_code: body_side_code.into(),
            diagnosis_certainty_code: diagnosis_certainty_code.into(),
        }
    }
}

/// A source row whose accession number was unique after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationRecord {
    pub identifier: CanonicalIdentifier,
    pub tumor_identifier: String,
    pub diagnosis_date: String,
    pub icd10_code: String,
    pub icd10_version: String,
    pub body_side_code: String,
    pub diagnosis_certainty_code: String,
}

impl ReconciliationRecord {
    /// Attach the canonical identifier to a raw row.
    pub fn from_row(identifier: CanonicalIdentifier, row: SourceRow) -> Self {
        Self {
            identifier,
            tumor_identifier: row.tumor_identifier,
            diagnosis_date: row.diagnosis_date,
            icd10_code: row.icd10_code,
            icd10_version: row.icd10_version,
            body_side_code: row.body_side_code,
            diagnosis_certainty_code: row.diagnosis_certainty_code,
        }
    }
}
