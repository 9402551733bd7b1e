//! Enrich, translate and cache report documents.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use onco_document::{DocumentError, ReportDocument};
use onco_model::{normalize, redact_value};
use onco_reconcile::{MergeFinding, ReconciliationIndex, SharedIndex, merge_diagnosis};

use crate::cache::{CacheEntry, MappingCache};
use crate::error::MappingError;
use crate::hash::{is_cache_key, sha256_hex};
use crate::translate::DocumentTranslator;

/// What happened to the messages of one document during enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    /// Messages seen.
    pub entries: usize,
    /// Messages whose accession number matched a record.
    pub hits: usize,
    /// Valid accession numbers with no unique record.
    pub misses: usize,
    /// Messages with a missing or unrecognized accession number.
    pub invalid: usize,
    /// Non-fatal merge findings across all hits.
    pub findings: usize,
}

/// Outcome of [`MappingService::map_and_cache`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingResult {
    /// Cache key of the stored output.
    pub key: String,
    pub patients_in: usize,
    pub patients_out: usize,
    pub messages_in: usize,
    pub messages_out: usize,
    pub enrichment: EnrichmentStats,
}

impl MappingResult {
    /// True when translation changed the number of patients or messages.
    pub fn has_warning(&self) -> bool {
        self.patients_in != self.patients_out || self.messages_in != self.messages_out
    }
}

pub struct MappingService {
    index: Arc<SharedIndex>,
    translator: Box<dyn DocumentTranslator>,
    cache: MappingCache,
}

impl MappingService {
    /// Service with an unbounded cache.
    pub fn new(index: Arc<SharedIndex>, translator: impl DocumentTranslator + 'static) -> Self {
        Self::with_cache(index, translator, MappingCache::default())
    }

    pub fn with_cache(
        index: Arc<SharedIndex>,
        translator: impl DocumentTranslator + 'static,
        cache: MappingCache,
    ) -> Self {
        Self {
            index,
            translator: Box::new(translator),
            cache,
        }
    }

    pub fn cache(&self) -> &MappingCache {
        &self.cache
    }

    /// Enrich `input` from the reconciliation index, translate it and cache
    /// the output under the SHA-256 of `input`.
    ///
    /// Storing replaces an earlier entry for the same input. Use
    /// [`MappingService::retrieve`] with the returned key to get the output.
    ///
    /// # Errors
    ///
    /// Fails when the input is not a report document or the translator
    /// rejects it. Nothing is cached in that case.
    pub fn map_and_cache(&self, input: &[u8]) -> Result<MappingResult, MappingError> {
        let key = sha256_hex(input);
        let span = info_span!("map_and_cache", key = %key);
        let _guard = span.enter();

        let mut document = ReportDocument::parse(input)?;
        // One snapshot per document so a concurrent rebuild cannot mix indexes.
        let index = self.index.snapshot();
        let enrichment = enrich(&mut document, &index)?;

        let translation = match self.translator.translate(&document) {
            Ok(translation) => translation,
            Err(error) => {
                warn!(translator = self.translator.name(), %error, "translation failed");
                return Err(error.into());
            }
        };

        let result = MappingResult {
            key: key.clone(),
            patients_in: translation.input.patients,
            patients_out: translation.output_counts.patients,
            messages_in: translation.input.messages,
            messages_out: translation.output_counts.messages,
            enrichment,
        };
        self.cache.store(key, translation.output);

        if result.has_warning() {
            warn!(
                patients_in = result.patients_in,
                patients_out = result.patients_out,
                messages_in = result.messages_in,
                messages_out = result.messages_out,
                "translated document lost content"
            );
        }
        info!(
            entries = enrichment.entries,
            hits = enrichment.hits,
            misses = enrichment.misses,
            invalid = enrichment.invalid,
            "document mapped and cached"
        );
        Ok(result)
    }

    /// Cached output for `key`, if present and not expired.
    pub fn retrieve(&self, key: &str) -> Option<Arc<CacheEntry>> {
        if !is_cache_key(key) {
            return None;
        }
        self.cache.get(key)
    }
}

/// Fill the diagnosis of every message whose accession number resolves.
///
/// A hit on a message without a diagnosis creates one.
fn enrich(
    document: &mut ReportDocument,
    index: &ReconciliationIndex,
) -> Result<EnrichmentStats, DocumentError> {
    let mut stats = EnrichmentStats::default();
    for entry in document.diagnosis_entries() {
        stats.entries += 1;
        let raw = entry.message_id.as_deref().unwrap_or_default();
        let Some(id) = normalize(raw).into_canonical() else {
            debug!(identifier = redact_value(raw), "accession number not recognized");
            stats.invalid += 1;
            continue;
        };
        let Some(record) = index.get(&id) else {
            debug!(identifier = redact_value(id.as_str()), "no unique record");
            stats.misses += 1;
            continue;
        };

        let mut diagnosis = entry.diagnosis.unwrap_or_default();
        let report = merge_diagnosis(&mut diagnosis, record);
        for finding in &report.findings {
            match finding {
                MergeFinding::DateFormatMismatch => debug!(
                    identifier = redact_value(id.as_str()),
                    "database diagnosis date not in YYYY-MM-DD form"
                ),
                MergeFinding::UnmappableBodySide { code } => debug!(
                    identifier = redact_value(id.as_str()),
                    code = redact_value(code),
                    "body side code replaced by U"
                ),
            }
        }
        stats.findings += report.findings.len();
        debug!(
            identifier = redact_value(id.as_str()),
            filled = report.filled.len(),
            "diagnosis merged"
        );
        document.set_diagnosis(entry.location, &diagnosis)?;
        stats.hits += 1;
    }
    Ok(stats)
}
