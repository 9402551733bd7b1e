//! Diagnosis fragment of a report message.

use serde::Serialize;

use crate::enums::BodySide;

/// Diagnosis fields that can be filled from the database extract.
///
/// Every field is optional because incoming reports are frequently
/// incomplete. Dates use the report format `DD.MM.YYYY`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosisRecord {
    pub diagnosis_date: Option<String>,
    pub tumor_identifier: Option<String>,
    pub icd10_code: Option<String>,
    pub icd10_version: Option<String>,
    pub body_side: Option<BodySide>,
    pub diagnosis_certainty: Option<String>,
}

impl DiagnosisRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        is_blank(self.diagnosis_date.as_deref())
            && is_blank(self.tumor_identifier.as_deref())
            && is_blank(self.icd10_code.as_deref())
            && is_blank(self.icd10_version.as_deref())
            && self.body_side.is_none()
            && is_blank(self.diagnosis_certainty.as_deref())
    }
}

/// Absent or whitespace-only.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
