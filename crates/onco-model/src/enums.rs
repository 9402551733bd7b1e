//! Closed code lists used in report documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Side of a paired organ the tumor was diagnosed on (Seitenlokalisation).
///
/// Codes are single upper-case letters, `U` is used whenever the side is
/// not known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodySide {
    /// `L`: left.
    Left,
    /// `R`: right.
    Right,
    /// `B`: both sides.
    Both,
    /// `M`: midline.
    Midline,
    /// `T`: not applicable.
    NotApplicable,
    /// `U`: unknown.
    Unknown,
}

impl BodySide {
    pub const ALL: [BodySide; 6] = [
        BodySide::Left,
        BodySide::Right,
        BodySide::Both,
        BodySide::Midline,
        BodySide::NotApplicable,
        BodySide::Unknown,
    ];

    /// Returns the code as written in report documents.
    pub fn as_code(&self) -> &'static str {
        match self {
            BodySide::Left => "L",
            BodySide::Right => "R",
            BodySide::Both => "B",
            BodySide::Midline => "M",
            BodySide::NotApplicable => "T",
            BodySide::Unknown => "U",
        }
    }

    /// Parse a code, substituting [`BodySide::Unknown`] for anything outside
    /// the code list.
    pub fn from_code_or_unknown(code: &str) -> Self {
        code.parse().unwrap_or(BodySide::Unknown)
    }
}

impl fmt::Display for BodySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

impl FromStr for BodySide {
    type Err = ModelError;

    /// Codes are matched case-sensitively after trimming whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L" => Ok(BodySide::Left),
            "R" => Ok(BodySide::Right),
            "B" => Ok(BodySide::Both),
            "M" => Ok(BodySide::Midline),
            "T" => Ok(BodySide::NotApplicable),
            "U" => Ok(BodySide::Unknown),
            _ => Err(ModelError::UnknownBodySide(s.to_string())),
        }
    }
}
