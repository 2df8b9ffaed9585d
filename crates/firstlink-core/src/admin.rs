use crate::error::AdminError;
use crate::repository::{RedirectId, RedirectRecord, RedirectSummary};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, AdminError>;

/// Parameters for creating a redirect, as received from a caller.
///
/// Fields are raw strings; validation happens in [`RedirectAdmin::create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRedirect {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub first_url: String,
    #[serde(default)]
    pub next_url: String,
}

/// CRUD over redirect records. Never touches first-use state.
#[async_trait]
pub trait RedirectAdmin: Send + Sync + 'static {
    /// Validates and stores a new redirect.
    async fn create(&self, params: CreateRedirect) -> Result<RedirectRecord>;

    /// Lists all redirects with visit counts, newest first.
    async fn list(&self) -> Result<Vec<RedirectSummary>>;

    /// Retrieves one redirect by id.
    async fn get(&self, id: RedirectId) -> Result<RedirectRecord>;

    /// Deletes a redirect and its ledger entries, returning the removed record.
    async fn delete(&self, id: RedirectId) -> Result<RedirectRecord>;
}
