use thiserror::Error;

/// Errors related to the core domain types.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
    #[error("invalid redirect id: {0}")]
    InvalidRedirectId(String),
    #[error("unknown first-visit policy: {0}")]
    UnknownPolicy(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record no longer exists: {0}")]
    Missing(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Errors surfaced by the admin collaborator.
#[derive(Debug, Clone, Error)]
pub enum AdminError {
    #[error("missing required fields: slug, firstUrl, nextUrl")]
    MissingFields,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid slug: {0}")]
    InvalidSlug(String),
    #[error("slug already exists: {0}")]
    Conflict(String),
    #[error("redirect not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<CoreError> for AdminError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidSlug(message) => Self::InvalidSlug(message),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<StorageError> for AdminError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(slug) => Self::Conflict(slug),
            StorageError::Missing(id) => Self::NotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}
