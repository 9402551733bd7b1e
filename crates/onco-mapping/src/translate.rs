//! Translation of enriched report documents into their output form.
//!
//! Schema translation proper is done by an external mapper plugged in
//! through [`DocumentTranslator`]. [`PassthroughTranslator`] keeps the input
//! schema and only applies the unmappable-content filter.

use tracing::warn;

use onco_document::{EntityCounts, ReportDocument};

use crate::error::TranslateError;

/// Output of a translation with entity counts on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub output: Vec<u8>,
    pub input: EntityCounts,
    pub output_counts: EntityCounts,
}

pub trait DocumentTranslator: Send + Sync {
    /// Translate `document`.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError`] when the document cannot be translated.
    /// Its message is shown to the user as is.
    fn translate(&self, document: &ReportDocument) -> Result<Translation, TranslateError>;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Writes the document back unchanged in schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator {
    ignore_unmappable: bool,
}

impl PassthroughTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop patients that carry no messages instead of passing them on.
    #[must_use]
    pub fn ignore_unmappable(mut self, enable: bool) -> Self {
        self.ignore_unmappable = enable;
        self
    }
}

impl DocumentTranslator for PassthroughTranslator {
    fn translate(&self, document: &ReportDocument) -> Result<Translation, TranslateError> {
        let input = document.counts();
        if !self.ignore_unmappable {
            return Ok(Translation {
                output: document.to_xml()?,
                input,
                output_counts: input,
            });
        }

        let mut filtered = document.clone();
        let removed = filtered.retain_patients(|patient| ReportDocument::message_count_of(patient) > 0);
        if removed > 0 {
            warn!(removed, "dropped patients without messages");
        }
        Ok(Translation {
            output: filtered.to_xml()?,
            input,
            output_counts: filtered.counts(),
        })
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<ADT_GEKID><Menge_Patient>\
        <Patient><Menge_Meldung><Meldung Meldung_ID=\"1\"/></Menge_Meldung></Patient>\
        <Patient/>\
        </Menge_Patient></ADT_GEKID>";

    #[test]
    fn keeps_everything_by_default() {
        let doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        let translation = PassthroughTranslator::new().translate(&doc).unwrap();
        assert_eq!(translation.input, translation.output_counts);
        assert_eq!(translation.output_counts.patients, 2);
        let reparsed = ReportDocument::parse(&translation.output).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn ignore_unmappable_drops_empty_patients() {
        let doc = ReportDocument::parse(DOC.as_bytes()).unwrap();
        let translation = PassthroughTranslator::new()
            .ignore_unmappable(true)
            .translate(&doc)
            .unwrap();
        assert_eq!(translation.input, EntityCounts { patients: 2, messages: 1 });
        assert_eq!(
            translation.output_counts,
            EntityCounts { patients: 1, messages: 1 }
        );
        assert_eq!(doc.patient_count(), 2);
    }
}
