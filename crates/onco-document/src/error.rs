use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    Empty,

    #[error("unexpected root element <{found}>, expected <{expected}>")]
    UnexpectedRoot { found: String, expected: &'static str },

    #[error("no message at patient {patient}, message {message}")]
    UnknownMessage { patient: usize, message: usize },

    #[error("failed to write XML: {0}")]
    Write(String),
}

pub type Result<T> = std::result::Result<T, DocumentError>;
