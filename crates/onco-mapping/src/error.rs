use std::path::PathBuf;

use thiserror::Error;

use onco_document::DocumentError;

/// Failure reported by a [`crate::DocumentTranslator`].
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The translator refused the document. The message is shown as given.
    #[error("{0}")]
    Rejected(String),

    #[error("failed to write translated document: {0}")]
    Output(#[from] DocumentError),
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("failed to read report document: {0}")]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}
