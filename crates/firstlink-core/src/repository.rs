use crate::error::{CoreError, StorageError};
use crate::slug::Slug;
use crate::visitor::VisitorId;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Opaque identifier assigned to a redirect record by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectId(u64);

impl RedirectId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Display for RedirectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RedirectId {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(RedirectId)
            .map_err(|_| CoreError::InvalidRedirectId(s.to_string()))
    }
}

/// A stored redirect configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRecord {
    pub id: RedirectId,
    pub slug: Slug,
    /// Destination for the first visit.
    pub first_url: String,
    /// Destination for every later visit.
    pub next_url: String,
    /// Whether the global first visit has been consumed. Never reverts.
    pub first_used: bool,
    pub created_at: Timestamp,
}

/// A validated redirect about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRedirect {
    pub slug: Slug,
    pub first_url: String,
    pub next_url: String,
}

/// A redirect record together with the number of visitors that have
/// consumed their first visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectSummary {
    #[serde(flatten)]
    pub record: RedirectRecord,
    pub visit_count: u64,
}

/// A read-only view of the redirect store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the record for a given slug.
    /// Returns `None` if the slug does not exist.
    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<RedirectRecord>>;

    /// Retrieves the record for a given id.
    async fn get_by_id(&self, id: RedirectId) -> Result<Option<RedirectRecord>>;

    /// Checks whether a slug is already taken.
    async fn exists(&self, slug: &Slug) -> Result<bool>;
}

/// Store operations owned by the admin collaborator.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new record and returns it with its assigned id.
    /// Returns `Err(Conflict)` if the slug already exists.
    async fn insert(&self, redirect: NewRedirect) -> Result<RedirectRecord>;

    /// Deletes a record together with its visit ledger entries.
    /// Returns the removed record, or `None` if it did not exist.
    async fn delete(&self, id: RedirectId) -> Result<Option<RedirectRecord>>;

    /// Lists all records with their visit counts, newest first.
    async fn list(&self) -> Result<Vec<RedirectSummary>>;
}

/// Store operations the resolution engine relies on for first-use state.
///
/// The store, not the caller, provides the isolation each method promises.
#[async_trait]
pub trait ResolutionStore: ReadRepository {
    /// Sets `first_used` unconditionally.
    ///
    /// Returns `Err(Missing)` when the record no longer exists.
    async fn mark_first_used(&self, id: RedirectId) -> Result<()>;

    /// Flips `first_used` from `false` to `true` as one atomic step.
    ///
    /// Returns `true` only for the caller whose write performed the flip,
    /// and `Err(Missing)` when the record no longer exists.
    async fn claim_first_use(&self, id: RedirectId) -> Result<bool>;

    /// Checks whether the visitor already consumed the first visit.
    async fn has_visited(&self, id: RedirectId, visitor: &VisitorId) -> Result<bool>;

    /// Inserts a ledger entry for the pair.
    ///
    /// Returns `Err(Conflict)` when the pair already exists and
    /// `Err(Missing)` when the record was deleted underneath the caller.
    async fn record_visit(&self, id: RedirectId, visitor: &VisitorId) -> Result<()>;
}
