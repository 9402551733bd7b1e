//! Accession number (Einsendenummer) normalization.
//!
//! Laboratories hand out accession numbers like `A/2025/001234`, but the
//! same number reaches us spelled in several ways:
//!
//! - `A/2025/1234` (number not padded)
//! - `A/25/1234` (two digit year)
//! - `A25/1234` (no slash between letter and year)
//! - any of the above with a sub-specimen suffix, e.g. `A/25/1234.100`
//!
//! All of them normalize to the canonical form `<letter>/20YY/<number>` with
//! the number zero-padded to six digits.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::ModelError;

const NUMBER_WIDTH: usize = 6;

/// Accepted raw shapes, tried in order. Each captures letter, two digit year
/// and number; the `.<suffix>` group is matched but dropped.
static RAW_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"^([A-Za-z])/20([0-9]{2})/([0-9]+)(\.[0-9]+)?$",
        r"^([A-Za-z])/([0-9]{2})/([0-9]+)(\.[0-9]+)?$",
        r"^([A-Za-z])([0-9]{2})/([0-9]+)(\.[0-9]+)?$",
    ]
    .map(|pattern| Regex::new(pattern).expect("accession pattern compiles"))
});

/// A normalized accession number, e.g. `A/2025/001234`.
///
/// Only [`normalize`] and [`FromStr`] create one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct CanonicalIdentifier(String);

impl CanonicalIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CanonicalIdentifier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s) {
            AccessionNumber::Valid(id) => Ok(id),
            AccessionNumber::Invalid { raw } => Err(ModelError::InvalidIdentifier(raw)),
        }
    }
}

/// Result of normalizing a raw accession number.
///
/// An invalid accession number compares unequal to everything, including
/// another invalid one with identical raw text. Only `PartialEq` is
/// implemented for that reason.
#[derive(Debug, Clone)]
pub enum AccessionNumber {
    Valid(CanonicalIdentifier),
    Invalid { raw: String },
}

impl AccessionNumber {
    pub fn is_valid(&self) -> bool {
        matches!(self, AccessionNumber::Valid(_))
    }

    pub fn canonical(&self) -> Option<&CanonicalIdentifier> {
        match self {
            AccessionNumber::Valid(id) => Some(id),
            AccessionNumber::Invalid { .. } => None,
        }
    }

    pub fn into_canonical(self) -> Option<CanonicalIdentifier> {
        match self {
            AccessionNumber::Valid(id) => Some(id),
            AccessionNumber::Invalid { .. } => None,
        }
    }
}

impl PartialEq for AccessionNumber {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AccessionNumber::Valid(a), AccessionNumber::Valid(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AccessionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessionNumber::Valid(id) => id.fmt(f),
            AccessionNumber::Invalid { raw } => write!(f, "invalid({raw})"),
        }
    }
}

/// Normalize a raw accession number.
///
/// Leading and trailing whitespace is ignored. Never fails: input matching
/// none of the accepted shapes yields [`AccessionNumber::Invalid`].
pub fn normalize(raw: &str) -> AccessionNumber {
    let trimmed = raw.trim();
    RAW_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(trimmed))
        .map(|caps| {
            let letter = &caps[1];
            let year = &caps[2];
            let number = &caps[3];
            AccessionNumber::Valid(CanonicalIdentifier(format!(
                "{letter}/20{year}/{number:0>NUMBER_WIDTH$}"
            )))
        })
        .unwrap_or_else(|| AccessionNumber::Invalid {
            raw: raw.to_string(),
        })
}
