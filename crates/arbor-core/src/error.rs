use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Field error: {0}")]
    Field(String),

    #[error("Key error: {0}")]
    Key(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}
