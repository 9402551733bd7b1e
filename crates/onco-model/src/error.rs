use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid accession number: {0:?}")]
    InvalidIdentifier(String),
    #[error("unknown body side code: {0:?}")]
    UnknownBodySide(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
