//! ADT/GEKID report documents.
//!
//! Layout: `ADT_GEKID / Menge_Patient / Patient / Menge_Meldung / Meldung`,
//! each message optionally holding one `Diagnose`. Everything else in the
//! document is carried through untouched.

use serde::Serialize;

use onco_model::{BodySide, DiagnosisRecord};

use crate::dom::{self, Element, Node};
use crate::error::{DocumentError, Result};

pub const ROOT: &str = "ADT_GEKID";
const PATIENT_SET: &str = "Menge_Patient";
const PATIENT: &str = "Patient";
const MESSAGE_SET: &str = "Menge_Meldung";
const MESSAGE: &str = "Meldung";
const MESSAGE_ID: &str = "Meldung_ID";
const DIAGNOSIS: &str = "Diagnose";
const TUMOR_ID: &str = "Tumor_ID";
const ICD_CODE: &str = "Primaertumor_ICD_Code";
const ICD_VERSION: &str = "Primaertumor_ICD_Version";
const DIAGNOSIS_DATE: &str = "Diagnosedatum";
const CERTAINTY: &str = "Diagnosesicherung";
const BODY_SIDE: &str = "Seitenlokalisation";

/// Children of `Meldung` preceding `Diagnose`.
const MESSAGE_ORDER: &[&str] = &[
    "Meldedatum",
    "Meldebegruendung",
    "Meldeanlass",
    "Tumorzuordnung",
    DIAGNOSIS,
];

/// Sequence of the `Diagnose` children this crate writes, with the
/// elements that sit between them.
const DIAGNOSIS_ORDER: &[&str] = &[
    ICD_CODE,
    ICD_VERSION,
    "Primaertumor_Diagnosetext",
    "Primaertumor_Topographie_ICD_O",
    "Primaertumor_Topographie_ICD_O_Version",
    "Primaertumor_Topographie_ICD_O_Freitext",
    DIAGNOSIS_DATE,
    CERTAINTY,
    "Menge_Fruehere_Tumorerkrankung",
    BODY_SIDE,
];

/// Number of patients and messages in a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub patients: usize,
    pub messages: usize,
}

/// Position of a message: patient index, then message index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageLocation {
    pub patient: usize,
    pub message: usize,
}

/// One message with whatever diagnosis it currently carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisEntry {
    pub location: MessageLocation,
    /// `Meldung_ID`, which holds the accession number.
    pub message_id: Option<String>,
    /// `None` when the message has no `Diagnose` element.
    pub diagnosis: Option<DiagnosisRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    root: Element,
}

fn is_named(name: &'static str) -> impl Fn(&&mut Element) -> bool {
    move |element: &&mut Element| element.local_name() == name
}

fn child_text(element: &Element, name: &str) -> Option<String> {
    element.child(name).map(Element::text)
}

fn patients_of(root: &Element) -> impl Iterator<Item = &Element> {
    root.children_named(PATIENT_SET)
        .flat_map(|set| set.children_named(PATIENT))
}

fn messages_of(patient: &Element) -> impl Iterator<Item = &Element> {
    patient
        .children_named(MESSAGE_SET)
        .flat_map(|set| set.children_named(MESSAGE))
}

fn read_diagnosis(diagnose: &Element) -> DiagnosisRecord {
    let body_side = child_text(diagnose, BODY_SIDE)
        .filter(|code| !code.trim().is_empty())
        .map(|code| BodySide::from_code_or_unknown(&code));
    DiagnosisRecord {
        diagnosis_date: child_text(diagnose, DIAGNOSIS_DATE),
        tumor_identifier: diagnose.attribute(TUMOR_ID).map(str::to_string),
        icd10_code: child_text(diagnose, ICD_CODE),
        icd10_version: child_text(diagnose, ICD_VERSION),
        body_side,
        diagnosis_certainty: child_text(diagnose, CERTAINTY),
    }
}

fn write_child_text(diagnose: &mut Element, name: &str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return;
    };
    if let Some(child) = diagnose.child_mut(name) {
        child.set_text(value);
        return;
    }
    insert_child_text(diagnose, name, value);
}

/// Like [`write_child_text`] but leaves a non-blank element as it is.
fn fill_child_text(diagnose: &mut Element, name: &str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return;
    };
    match diagnose.child_mut(name) {
        Some(child) if child.text().trim().is_empty() => child.set_text(value),
        Some(_) => {}
        None => insert_child_text(diagnose, name, value),
    }
}

fn insert_child_text(diagnose: &mut Element, name: &str, value: &str) {
    let child = Element::with_text(diagnose.qualified(name), value);
    diagnose.insert_ordered(child, DIAGNOSIS_ORDER);
}

impl ReportDocument {
    /// Parse a document whose root element is `ADT_GEKID`.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let root = dom::parse(bytes)?;
        if root.local_name() != ROOT {
            return Err(DocumentError::UnexpectedRoot {
                found: root.name,
                expected: ROOT,
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn patients(&self) -> impl Iterator<Item = &Element> {
        patients_of(&self.root)
    }

    pub fn patient_count(&self) -> usize {
        self.patients().count()
    }

    pub fn message_count(&self) -> usize {
        self.patients().map(|patient| messages_of(patient).count()).sum()
    }

    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            patients: self.patient_count(),
            messages: self.message_count(),
        }
    }

    /// Every message in document order.
    pub fn diagnosis_entries(&self) -> Vec<DiagnosisEntry> {
        let mut entries = Vec::new();
        for (patient_index, patient) in self.patients().enumerate() {
            for (message_index, message) in messages_of(patient).enumerate() {
                entries.push(DiagnosisEntry {
                    location: MessageLocation {
                        patient: patient_index,
                        message: message_index,
                    },
                    message_id: message.attribute(MESSAGE_ID).map(str::to_string),
                    diagnosis: message.child(DIAGNOSIS).map(read_diagnosis),
                });
            }
        }
        entries
    }

    fn message_mut(&mut self, location: MessageLocation) -> Result<&mut Element> {
        self.root
            .elements_mut()
            .filter(is_named(PATIENT_SET))
            .flat_map(|set| set.elements_mut().filter(is_named(PATIENT)))
            .nth(location.patient)
            .and_then(|patient| {
                patient
                    .elements_mut()
                    .filter(is_named(MESSAGE_SET))
                    .flat_map(|set| set.elements_mut().filter(is_named(MESSAGE)))
                    .nth(location.message)
            })
            .ok_or(DocumentError::UnknownMessage {
                patient: location.patient,
                message: location.message,
            })
    }

    /// Write the non-blank fields of `diagnosis` into the message at
    /// `location`, creating the `Diagnose` element if needed.
    ///
    /// Existing elements are updated in place, missing ones are inserted in
    /// schema order. Blank fields leave the document as it is, and a
    /// non-blank `Seitenlokalisation` is never rewritten.
    pub fn set_diagnosis(
        &mut self,
        location: MessageLocation,
        diagnosis: &DiagnosisRecord,
    ) -> Result<()> {
        let message = self.message_mut(location)?;
        if message.child(DIAGNOSIS).is_none() {
            let diagnose = Element::new(message.qualified(DIAGNOSIS));
            message.insert_ordered(diagnose, MESSAGE_ORDER);
        }
        let Some(diagnose) = message.child_mut(DIAGNOSIS) else {
            return Err(DocumentError::UnknownMessage {
                patient: location.patient,
                message: location.message,
            });
        };

        if let Some(tumor) = diagnosis.tumor_identifier.as_deref()
            && !tumor.trim().is_empty()
        {
            diagnose.set_attribute(TUMOR_ID, tumor);
        }
        write_child_text(diagnose, ICD_CODE, diagnosis.icd10_code.as_deref());
        write_child_text(diagnose, ICD_VERSION, diagnosis.icd10_version.as_deref());
        write_child_text(diagnose, DIAGNOSIS_DATE, diagnosis.diagnosis_date.as_deref());
        write_child_text(diagnose, CERTAINTY, diagnosis.diagnosis_certainty.as_deref());
        // Codes outside the list read back as `U`; the report's own text stays.
        fill_child_text(
            diagnose,
            BODY_SIDE,
            diagnosis.body_side.as_ref().map(BodySide::as_code),
        );
        Ok(())
    }

    /// Keep only patients for which `keep` returns true. Returns the number
    /// of patients removed.
    pub fn retain_patients(&mut self, mut keep: impl FnMut(&Element) -> bool) -> usize {
        let mut removed = 0;
        for set in self.root.elements_mut().filter(is_named(PATIENT_SET)) {
            set.children.retain(|node| match node {
                Node::Element(patient) if patient.local_name() == PATIENT => {
                    let retain = keep(patient);
                    if !retain {
                        removed += 1;
                    }
                    retain
                }
                _ => true,
            });
        }
        removed
    }

    /// Number of messages a patient element carries.
    pub fn message_count_of(patient: &Element) -> usize {
        messages_of(patient).count()
    }

    pub fn to_xml(&self) -> Result<Vec<u8>> {
        dom::write(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ADT_GEKID Schema_Version="2.2.3">
  <Menge_Patient>
    <Patient>
      <Menge_Meldung>
        <Meldung Meldung_ID="A/2025/1234">
          <Meldedatum>02.07.2024</Meldedatum>
          <Diagnose Tumor_ID="7">
            <Primaertumor_ICD_Code>C50.1</Primaertumor_ICD_Code>
            <Seitenlokalisation>X</Seitenlokalisation>
          </Diagnose>
        </Meldung>
        <Meldung Meldung_ID="B25/9"/>
      </Menge_Meldung>
    </Patient>
  </Menge_Patient>
</ADT_GEKID>"#;

    #[test]
    fn reads_entries() {
        let doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        assert_eq!(doc.counts(), EntityCounts { patients: 1, messages: 2 });
        let entries = doc.diagnosis_entries();
        assert_eq!(entries[0].message_id.as_deref(), Some("A/2025/1234"));
        let diagnosis = entries[0].diagnosis.as_ref().unwrap();
        assert_eq!(diagnosis.tumor_identifier.as_deref(), Some("7"));
        assert_eq!(diagnosis.icd10_code.as_deref(), Some("C50.1"));
        assert_eq!(diagnosis.icd10_version, None);
        assert_eq!(diagnosis.body_side, Some(BodySide::Unknown));
        assert_eq!(entries[1].diagnosis, None);
    }

    #[test]
    fn rejects_other_roots() {
        let err = ReportDocument::parse(b"<Other/>").unwrap_err();
        assert!(matches!(err, DocumentError::UnexpectedRoot { .. }));
    }

    #[test]
    fn set_diagnosis_on_unknown_message_fails() {
        let mut doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        let location = MessageLocation { patient: 0, message: 5 };
        let err = doc.set_diagnosis(location, &DiagnosisRecord::new()).unwrap_err();
        assert!(matches!(err, DocumentError::UnknownMessage { message: 5, .. }));
    }

    #[test]
    fn set_diagnosis_inserts_in_order() {
        let mut doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        let diagnosis = DiagnosisRecord {
            diagnosis_date: Some("01.07.2024".to_string()),
            icd10_version: Some("10 2022 GM".to_string()),
            diagnosis_certainty: Some("2".to_string()),
            ..DiagnosisRecord::default()
        };
        doc.set_diagnosis(MessageLocation { patient: 0, message: 0 }, &diagnosis)
            .unwrap();
        let message = doc.patients().flat_map(messages_of).next().unwrap();
        let names: Vec<_> = message
            .child(DIAGNOSIS)
            .unwrap()
            .elements()
            .map(Element::local_name)
            .collect();
        assert_eq!(
            names,
            [ICD_CODE, ICD_VERSION, DIAGNOSIS_DATE, CERTAINTY, BODY_SIDE]
        );
    }

    #[test]
    fn set_diagnosis_keeps_unlisted_body_side_text() {
        let mut doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        let diagnosis = DiagnosisRecord {
            body_side: Some(BodySide::Unknown),
            ..DiagnosisRecord::default()
        };
        doc.set_diagnosis(MessageLocation { patient: 0, message: 0 }, &diagnosis)
            .unwrap();
        let message = doc.patients().flat_map(messages_of).next().unwrap();
        let side = message.child(DIAGNOSIS).unwrap().child(BODY_SIDE).unwrap();
        assert_eq!(side.text(), "X");
    }

    #[test]
    fn retain_patients_counts_removed() {
        let mut doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        let removed = doc.retain_patients(|patient| ReportDocument::message_count_of(patient) > 5);
        assert_eq!(removed, 1);
        assert_eq!(doc.counts(), EntityCounts::default());
    }
}
