//! Filling diagnosis gaps from a reconciliation record.
//!
//! Values already present in the report win over the database, with one
//! exception: the diagnosis certainty code from the database always replaces
//! the report's value, since reports tend to carry a default there.

use serde::Serialize;

use onco_model::{BodySide, DiagnosisRecord, ReconciliationRecord, is_blank};

use crate::datetime::to_report_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosisField {
    DiagnosisDate,
    TumorIdentifier,
    Icd10Code,
    Icd10Version,
    BodySide,
    DiagnosisCertainty,
}

/// Non-fatal problems met while merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MergeFinding {
    /// The database date is not `YYYY-MM-DD`; the date stays empty.
    DateFormatMismatch,
    /// The database body side code is outside the code list; `U` was used.
    UnmappableBodySide { code: String },
}

/// What a merge changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub filled: Vec<DiagnosisField>,
    pub findings: Vec<MergeFinding>,
}

/// Merge `record` into `diagnosis` in place.
pub fn merge_diagnosis(
    diagnosis: &mut DiagnosisRecord,
    record: &ReconciliationRecord,
) -> MergeReport {
    let mut report = MergeReport::default();

    if is_blank(diagnosis.diagnosis_date.as_deref()) && !record.diagnosis_date.trim().is_empty() {
        match to_report_date(&record.diagnosis_date) {
            Some(date) => {
                diagnosis.diagnosis_date = Some(date);
                report.filled.push(DiagnosisField::DiagnosisDate);
            }
            None => report.findings.push(MergeFinding::DateFormatMismatch),
        }
    }

    fill_text(
        &mut diagnosis.tumor_identifier,
        &record.tumor_identifier,
        DiagnosisField::TumorIdentifier,
        &mut report,
    );
    fill_text(
        &mut diagnosis.icd10_code,
        &record.icd10_code,
        DiagnosisField::Icd10Code,
        &mut report,
    );
    fill_text(
        &mut diagnosis.icd10_version,
        &record.icd10_version,
        DiagnosisField::Icd10Version,
        &mut report,
    );

    if diagnosis.body_side.is_none() {
        let side = match record.body_side_code.parse::<BodySide>() {
            Ok(side) => side,
            Err(_) => {
                report.findings.push(MergeFinding::UnmappableBodySide {
                    code: record.body_side_code.clone(),
                });
                BodySide::Unknown
            }
        };
        diagnosis.body_side = Some(side);
        report.filled.push(DiagnosisField::BodySide);
    }

    if !record.diagnosis_certainty_code.trim().is_empty() {
        diagnosis.diagnosis_certainty = Some(record.diagnosis_certainty_code.clone());
        report.filled.push(DiagnosisField::DiagnosisCertainty);
    }

    report
}

fn fill_text(
    target: &mut Option<String>,
    source: &str,
    field: DiagnosisField,
    report: &mut MergeReport,
) {
    if is_blank(target.as_deref()) && !source.trim().is_empty() {
        *target = Some(source.to_string());
        report.filled.push(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onco_model::CanonicalIdentifier;

    fn record(date: &str, side: &str, certainty: &str) -> ReconciliationRecord {
        ReconciliationRecord {
            identifier: "A/2025/001234".parse::<CanonicalIdentifier>().unwrap(),
            tumor_identifier: "1".to_string(),
            diagnosis_date: date.to_string(),
            icd10_code: "C00.0".to_string(),
            icd10_version: "10 2022 GM".to_string(),
            body_side_code: side.to_string(),
            diagnosis_certainty_code: certainty.to_string(),
        }
    }

    #[test]
    fn fills_empty_diagnosis() {
        let mut diagnosis = DiagnosisRecord::new();
        let report = merge_diagnosis(&mut diagnosis, &record("2024-07-01", "L", "2"));
        assert_eq!(diagnosis.diagnosis_date.as_deref(), Some("01.07.2024"));
        assert_eq!(diagnosis.tumor_identifier.as_deref(), Some("1"));
        assert_eq!(diagnosis.icd10_code.as_deref(), Some("C00.0"));
        assert_eq!(diagnosis.icd10_version.as_deref(), Some("10 2022 GM"));
        assert_eq!(diagnosis.body_side, Some(BodySide::Left));
        assert_eq!(diagnosis.diagnosis_certainty.as_deref(), Some("2"));
        assert_eq!(report.filled.len(), 6);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn whitespace_counts_as_blank() {
        let mut diagnosis = DiagnosisRecord {
            icd10_code: Some("  ".to_string()),
            ..DiagnosisRecord::default()
        };
        merge_diagnosis(&mut diagnosis, &record("2024-07-01", "L", "2"));
        assert_eq!(diagnosis.icd10_code.as_deref(), Some("C00.0"));
    }

    #[test]
    fn blank_record_values_fill_nothing() {
        let mut diagnosis = DiagnosisRecord::new();
        let mut source = record("", "R", "");
        source.icd10_version = String::new();
        let report = merge_diagnosis(&mut diagnosis, &source);
        assert_eq!(diagnosis.diagnosis_date, None);
        assert_eq!(diagnosis.icd10_version, None);
        assert_eq!(diagnosis.diagnosis_certainty, None);
        assert!(report.findings.is_empty());
    }
}
