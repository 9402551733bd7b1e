//! Exact-match index from canonical accession number to extract row.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use onco_ingest::LoadedRows;
use onco_model::{CanonicalIdentifier, ReconciliationRecord, SourceRow, normalize, redact_value};

/// Counters collected while building an index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Rows offered to the build.
    pub rows: usize,
    /// Rows that ended up in the index.
    pub kept: usize,
    /// Rows whose accession number did not normalize.
    pub invalid: usize,
    /// Accession numbers seen on more than one row.
    pub ambiguous_identifiers: usize,
    /// Rows dropped because their accession number was ambiguous.
    pub ambiguous_rows: usize,
    /// Records the row source could not read.
    pub skipped: usize,
}

enum Slot {
    Unique(SourceRow),
    Ambiguous(usize),
}

/// Index of extract rows whose accession number is unique.
///
/// An accession number appearing on two or more rows cannot be trusted to
/// name a single diagnosis, so all of its rows are left out.
#[derive(Debug, Clone)]
pub struct ReconciliationIndex {
    records: BTreeMap<CanonicalIdentifier, ReconciliationRecord>,
    stats: BuildStats,
}

impl Default for ReconciliationIndex {
    fn default() -> Self {
        Self::empty()
    }
}

impl ReconciliationIndex {
    pub fn empty() -> Self {
        Self {
            records: BTreeMap::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = SourceRow>,
    {
        let mut stats = BuildStats::default();
        let mut slots: BTreeMap<CanonicalIdentifier, Slot> = BTreeMap::new();

        for row in rows {
            stats.rows += 1;
            let Some(id) = normalize(&row.accession_identifier).into_canonical() else {
                stats.invalid += 1;
                continue;
            };
            match slots.entry(id) {
                Entry::Vacant(entry) => {
                    entry.insert(Slot::Unique(row));
                }
                Entry::Occupied(mut entry) => {
                    let seen = match entry.get() {
                        Slot::Unique(_) => 1,
                        Slot::Ambiguous(count) => *count,
                    };
                    entry.insert(Slot::Ambiguous(seen + 1));
                }
            }
        }

        let mut records = BTreeMap::new();
        for (id, slot) in slots {
            match slot {
                Slot::Unique(row) => {
                    records.insert(id.clone(), ReconciliationRecord::from_row(id, row));
                }
                Slot::Ambiguous(count) => {
                    debug!(
                        identifier = redact_value(id.as_str()),
                        rows = count,
                        "ambiguous accession number excluded"
                    );
                    stats.ambiguous_identifiers += 1;
                    stats.ambiguous_rows += count;
                }
            }
        }
        stats.kept = records.len();

        debug!(
            rows = stats.rows,
            kept = stats.kept,
            invalid = stats.invalid,
            ambiguous_identifiers = stats.ambiguous_identifiers,
            ambiguous_rows = stats.ambiguous_rows,
            "built reconciliation index"
        );

        Self {
            records,
            stats,
        }
    }

    /// Build from a row source load, carrying over its skip count.
    pub fn from_loaded(loaded: LoadedRows) -> Self {
        let skipped = loaded.skipped;
        let mut index = Self::build(loaded.rows);
        index.stats.skipped = skipped;
        index
    }

    /// Look up a raw accession number in any accepted spelling.
    pub fn lookup(&self, raw: &str) -> Option<&ReconciliationRecord> {
        let id = normalize(raw).into_canonical()?;
        self.records.get(&id)
    }

    pub fn get(&self, id: &CanonicalIdentifier) -> Option<&ReconciliationRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, tumor: &str) -> SourceRow {
        SourceRow::new(id, tumor, "2024-07-01", "C00.0", "10 2022 GM", "L", "2")
    }

    #[test]
    fn keeps_unique_rows() {
        let index = ReconciliationIndex::build(vec![row("A/2025/1", "1"), row("A/2025/2", "2")]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.stats().kept, 2);
        assert_eq!(index.lookup("A25/2").map(|r| r.tumor_identifier.as_str()), Some("2"));
    }

    #[test]
    fn counts_ambiguous_rows() {
        let index = ReconciliationIndex::build(vec![
            row("A/2025/1", "1"),
            row("A25/1", "2"),
            row("A/25/000001.2", "3"),
            row("A/2025/9", "9"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.stats().ambiguous_identifiers, 1);
        assert_eq!(index.stats().ambiguous_rows, 3);
        assert!(index.lookup("A/2025/000001").is_none());
    }

    #[test]
    fn invalid_rows_are_counted_not_indexed() {
        let index = ReconciliationIndex::build(vec![row("", "1"), row("A/2025/1 A/2025/2", "2")]);
        assert!(index.is_empty());
        assert_eq!(index.stats().invalid, 2);
        assert!(index.lookup("").is_none());
    }

    #[test]
    fn skipped_records_are_carried_over() {
        let loaded = LoadedRows {
            rows: vec![row("A/2025/1", "1")],
            skipped: 4,
        };
        let index = ReconciliationIndex::from_loaded(loaded);
        assert_eq!(index.stats().skipped, 4);
        assert_eq!(index.len(), 1);
    }
}
