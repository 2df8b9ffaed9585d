use async_trait::async_trait;
use firstlink_core::{
    AdminError, CreateRedirect, NewRedirect, RedirectAdmin, RedirectId, RedirectRecord,
    RedirectSummary, Repository, Slug,
};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Slugs shadowed by the gateway's own routes.
pub const RESERVED_SLUGS: &[&str] = &["health", "api"];

/// A concrete implementation of the [`RedirectAdmin`] trait.
///
/// This service wraps a [`Repository`] to handle:
/// - Required field and URL validation
/// - Slug validation and uniqueness
/// - Deletion with cascading ledger entries
#[derive(Debug)]
pub struct AdminService<R> {
    repository: Arc<R>,
}

impl<R> Clone for AdminService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: Repository> AdminService<R> {
    /// Creates a new `AdminService` over the given repository.
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Validates that the URL is absolute with an http(s) scheme and a host.
    fn validate_url(url: &str) -> Result<(), AdminError> {
        let parsed = Url::parse(url).map_err(|e| AdminError::InvalidUrl(format!("{url}: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AdminError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                parsed.scheme()
            )));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(AdminError::InvalidUrl(format!("URL must have a host: {url}")));
        }

        Ok(())
    }
}

#[async_trait]
impl<R: Repository> RedirectAdmin for AdminService<R> {
    async fn create(&self, params: CreateRedirect) -> Result<RedirectRecord, AdminError> {
        let slug = params.slug.trim();
        let first_url = params.first_url.trim();
        let next_url = params.next_url.trim();

        if slug.is_empty() || first_url.is_empty() || next_url.is_empty() {
            return Err(AdminError::MissingFields);
        }

        Self::validate_url(first_url)?;
        Self::validate_url(next_url)?;
        let slug = Slug::new(slug)?;
        if RESERVED_SLUGS.contains(&slug.as_str()) {
            return Err(AdminError::InvalidSlug(format!("{slug} is reserved")));
        }

        if self.repository.exists(&slug).await? {
            return Err(AdminError::Conflict(slug.to_string()));
        }

        // The store rejects a duplicate that slipped past the check above.
        let record = self
            .repository
            .insert(NewRedirect {
                slug,
                first_url: first_url.to_string(),
                next_url: next_url.to_string(),
            })
            .await?;

        info!(slug = %record.slug, id = %record.id, "created redirect");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<RedirectSummary>, AdminError> {
        let summaries = self.repository.list().await?;
        debug!(count = summaries.len(), "listed redirects");
        Ok(summaries)
    }

    async fn get(&self, id: RedirectId) -> Result<RedirectRecord, AdminError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| AdminError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: RedirectId) -> Result<RedirectRecord, AdminError> {
        let record = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| AdminError::NotFound(id.to_string()))?;

        info!(slug = %record.slug, id = %record.id, "deleted redirect");
        Ok(record)
    }
}
