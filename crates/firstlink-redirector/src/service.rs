use std::sync::Arc;

use crate::redirector::{Redirector, Resolution};
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use firstlink_core::{
    FirstVisitPolicy, RedirectRecord, ResolutionStore, Slug, StorageError, VisitorId,
};
use tracing::{debug, trace};

/// Service for resolving slugs to first-visit or next-visit destinations.
///
/// Requests for the same slug are never serialized in process. Correctness
/// under concurrency comes from the store: a compare-and-swap for
/// [`FirstVisitPolicy::AtomicGlobal`] and a uniqueness-enforced insert for
/// [`FirstVisitPolicy::PerVisitor`]. [`FirstVisitPolicy::Global`] reads and
/// writes separately and may hand the first URL to several concurrent callers.
#[derive(Debug)]
pub struct RedirectorService<S> {
    store: Arc<S>,
    policy: FirstVisitPolicy,
}

impl<S> Clone for RedirectorService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<S: ResolutionStore> RedirectorService<S> {
    /// Creates a new RedirectorService with the given store and policy.
    pub fn new(store: S, policy: FirstVisitPolicy) -> Self {
        Self {
            store: Arc::new(store),
            policy,
        }
    }

    /// Resolves a slug to its destination.
    ///
    /// # Returns
    ///
    /// * `Ok(resolution)` - The destination and whether it was the first visit
    /// * `Err(RedirectorError::NotFound)` - If the slug does not exist
    /// * `Err(RedirectorError::Storage)` - If the store failed
    pub async fn resolve(&self, slug: &Slug, visitor: Option<&VisitorId>) -> Result<Resolution> {
        Redirector::resolve(self, slug, visitor).await
    }

    async fn first_visit_global(&self, record: &RedirectRecord) -> Result<bool> {
        if record.first_used {
            return Ok(false);
        }

        // Not atomic with the read above.
        self.store
            .mark_first_used(record.id)
            .await
            .map_err(|err| vanished(err, record))?;
        Ok(true)
    }

    async fn first_visit_atomic(&self, record: &RedirectRecord) -> Result<bool> {
        if record.first_used {
            return Ok(false);
        }

        let won = self
            .store
            .claim_first_use(record.id)
            .await
            .map_err(|err| vanished(err, record))?;
        if !won {
            debug!(slug = %record.slug, "first use claimed by a concurrent resolution");
        }
        Ok(won)
    }

    async fn first_visit_per_visitor(
        &self,
        record: &RedirectRecord,
        visitor: &VisitorId,
    ) -> Result<bool> {
        if self.store.has_visited(record.id, visitor).await? {
            return Ok(false);
        }

        match self.store.record_visit(record.id, visitor).await {
            Ok(()) => Ok(true),
            Err(StorageError::Conflict(_)) => {
                debug!(
                    slug = %record.slug,
                    visitor = %visitor,
                    "visit recorded by a concurrent resolution"
                );
                Ok(false)
            }
            Err(err) => Err(vanished(err, record)),
        }
    }
}

/// A record deleted mid-resolution reads as not found.
fn vanished(err: StorageError, record: &RedirectRecord) -> RedirectorError {
    match err {
        StorageError::Missing(_) => RedirectorError::NotFound(record.slug.to_string()),
        other => other.into(),
    }
}

#[async_trait]
impl<S: ResolutionStore> Redirector for RedirectorService<S> {
    async fn resolve(&self, slug: &Slug, visitor: Option<&VisitorId>) -> Result<Resolution> {
        trace!(slug = %slug, policy = %self.policy, "resolving slug");

        let Some(record) = self.store.get_by_slug(slug).await? else {
            trace!(slug = %slug, "slug not found");
            return Err(RedirectorError::NotFound(slug.to_string()));
        };

        let first_visit = match self.policy {
            FirstVisitPolicy::Global => self.first_visit_global(&record).await?,
            FirstVisitPolicy::AtomicGlobal => self.first_visit_atomic(&record).await?,
            FirstVisitPolicy::PerVisitor => {
                let loopback;
                let visitor = match visitor {
                    Some(visitor) => visitor,
                    None => {
                        loopback = VisitorId::loopback();
                        &loopback
                    }
                };
                self.first_visit_per_visitor(&record, visitor).await?
            }
        };

        let destination = if first_visit {
            record.first_url
        } else {
            record.next_url
        };

        debug!(slug = %slug, first_visit, url = %destination, "resolved slug");
        Ok(Resolution {
            destination,
            first_visit,
        })
    }
}
