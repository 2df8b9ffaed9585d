use firstlink_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

/// Outcomes of a resolution other than a destination.
#[derive(Debug, Error)]
pub enum RedirectorError {
    #[error("redirect not found: {0}")]
    NotFound(String),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}
