//! Enrichment and caching of report documents.
//!
//! [`MappingService`] ties the pieces together: it hashes the raw input,
//! fills diagnosis gaps from the shared reconciliation index, hands the
//! document to a [`DocumentTranslator`] and keeps the output in a
//! [`MappingCache`] under the input hash.

#![deny(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
pub mod service;
pub mod translate;

pub use cache::{CacheEntry, MappingCache, RetentionPolicy};
pub use config::{MappingConfig, RetentionConfig};
pub use error::{ConfigError, MappingError, TranslateError};
pub use hash::{is_cache_key, sha256_hex};
pub use service::{EnrichmentStats, MappingResult, MappingService};
pub use translate::{DocumentTranslator, PassthroughTranslator, Translation};
