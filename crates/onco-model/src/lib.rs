#![deny(unsafe_code)]

pub mod diagnosis;
pub mod enums;
pub mod error;
pub mod ids;
pub mod record;
pub mod redact;

pub use diagnosis::{DiagnosisRecord, is_blank};
pub use enums::BodySide;
pub use error::{ModelError, Result};
pub use ids::{AccessionNumber, CanonicalIdentifier, normalize};
pub use record::{ReconciliationRecord, SourceRow};
pub use redact::redact_value;
