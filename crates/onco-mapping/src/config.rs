//! Mapping configuration, read from a TOML file.
//!
//! ```toml
//! refresh_interval_secs = 3600
//! ignore_unmappable = true
//!
//! [retention]
//! max_entries = 500
//! max_age_secs = 86400
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::RetentionPolicy;
use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetentionConfig {
    pub max_entries: Option<usize>,
    pub max_age_secs: Option<u64>,
}

impl RetentionConfig {
    /// A zero limit would drop output before it can be retrieved.
    fn validate(&self) -> Result<(), String> {
        if self.max_entries == Some(0) {
            return Err("retention.max_entries must be at least 1".to_string());
        }
        if self.max_age_secs == Some(0) {
            return Err("retention.max_age_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn policy(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_entries: self.max_entries,
            max_age: self.max_age_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MappingConfig {
    pub retention: RetentionConfig,
    /// Rebuild the reconciliation index this often. Unset or zero disables
    /// periodic rebuilds.
    pub refresh_interval_secs: Option<u64>,
    pub ignore_unmappable: bool,
}

impl MappingConfig {
    /// Read a config file. Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if a
    /// retention limit is zero.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.retention.validate().map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}
