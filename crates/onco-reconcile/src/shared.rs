//! Process-wide reconciliation index with atomic replacement.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use onco_ingest::{IngestError, RowSource};
use onco_model::ReconciliationRecord;

use crate::index::{BuildStats, ReconciliationIndex};

/// Holder of the current [`ReconciliationIndex`].
///
/// Readers take a snapshot (`Arc` clone) and keep using it for as long as
/// they like; a rebuild assembles the new index without holding the lock
/// and swaps it in at the end. A failed rebuild leaves the previous index in
/// place.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Arc<ReconciliationIndex>>,
}

impl SharedIndex {
    pub fn new(index: ReconciliationIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Current index. Later rebuilds do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<ReconciliationIndex> {
        // The guarded value is a single Arc, a poisoned lock still holds a
        // complete index.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn lookup(&self, raw: &str) -> Option<ReconciliationRecord> {
        self.snapshot().lookup(raw).cloned()
    }

    /// Swap in a fully built index.
    pub fn replace(&self, index: ReconciliationIndex) {
        let next = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// Reload rows from `source` and replace the index.
    ///
    /// # Errors
    ///
    /// Returns the load error; the previous index stays active.
    pub fn refresh(&self, source: &dyn RowSource) -> Result<BuildStats, IngestError> {
        let loaded = match source.load() {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(
                    source = %source.describe(),
                    %error,
                    "index rebuild failed, keeping previous index"
                );
                return Err(error);
            }
        };
        let index = ReconciliationIndex::from_loaded(loaded);
        let stats = index.stats().clone();
        self.replace(index);
        info!(
            source = %source.describe(),
            kept = stats.kept,
            rows = stats.rows,
            ambiguous = stats.ambiguous_identifiers,
            invalid = stats.invalid,
            "reconciliation index replaced"
        );
        Ok(stats)
    }
}
