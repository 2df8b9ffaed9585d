use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use firstlink_core::repository::{
    NewRedirect, ReadRepository, RedirectId, RedirectRecord, RedirectSummary, Repository,
    ResolutionStore, Result,
};
use firstlink_core::{Slug, StorageError, VisitorId};
use jiff::Timestamp;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct State {
    next_id: AtomicU64,
    slugs: DashMap<String, RedirectId>,
    records: DashMap<RedirectId, RedirectRecord>,
    visits: DashMap<(RedirectId, String), Timestamp>,
}

/// In-memory implementation of the store contracts using DashMap.
///
/// Clones share the same state, so one instance can back both the
/// resolution engine and the admin service. Per-key atomicity comes from
/// DashMap's shard locks: `claim_first_use` runs under a write guard on
/// the record and `record_visit` goes through the entry API, which is the
/// in-process equivalent of a unique-key insert.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<State>,
}

impl InMemoryRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn visit_key(id: RedirectId, visitor: &VisitorId) -> (RedirectId, String) {
        (id, visitor.as_str().to_owned())
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get_by_slug(&self, slug: &Slug) -> Result<Option<RedirectRecord>> {
        let Some(id) = self.state.slugs.get(slug.as_str()).map(|id| *id) else {
            return Ok(None);
        };

        Ok(self.state.records.get(&id).map(|record| record.clone()))
    }

    async fn get_by_id(&self, id: RedirectId) -> Result<Option<RedirectRecord>> {
        Ok(self.state.records.get(&id).map(|record| record.clone()))
    }

    async fn exists(&self, slug: &Slug) -> Result<bool> {
        Ok(self.state.slugs.contains_key(slug.as_str()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, redirect: NewRedirect) -> Result<RedirectRecord> {
        match self.state.slugs.entry(redirect.slug.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(redirect.slug.to_string())),
            Entry::Vacant(vacant) => {
                let id = RedirectId::new(self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                let record = RedirectRecord {
                    id,
                    slug: redirect.slug,
                    first_url: redirect.first_url,
                    next_url: redirect.next_url,
                    first_used: false,
                    created_at: Timestamp::now(),
                };

                self.state.records.insert(id, record.clone());
                vacant.insert(id);
                Ok(record)
            }
        }
    }

    async fn delete(&self, id: RedirectId) -> Result<Option<RedirectRecord>> {
        let Some((_, record)) = self.state.records.remove(&id) else {
            return Ok(None);
        };

        self.state.slugs.remove(record.slug.as_str());
        self.state.visits.retain(|(owner, _), _| *owner != id);
        Ok(Some(record))
    }

    async fn list(&self) -> Result<Vec<RedirectSummary>> {
        let mut counts: HashMap<RedirectId, u64> = HashMap::new();
        for visit in self.state.visits.iter() {
            *counts.entry(visit.key().0).or_default() += 1;
        }

        let mut summaries: Vec<RedirectSummary> = self
            .state
            .records
            .iter()
            .map(|record| RedirectSummary {
                visit_count: counts.get(record.key()).copied().unwrap_or(0),
                record: record.value().clone(),
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then_with(|| b.record.id.cmp(&a.record.id))
        });
        Ok(summaries)
    }
}

#[async_trait]
impl ResolutionStore for InMemoryRepository {
    async fn mark_first_used(&self, id: RedirectId) -> Result<()> {
        let Some(mut record) = self.state.records.get_mut(&id) else {
            return Err(StorageError::Missing(id.to_string()));
        };

        record.first_used = true;
        Ok(())
    }

    async fn claim_first_use(&self, id: RedirectId) -> Result<bool> {
        let Some(mut record) = self.state.records.get_mut(&id) else {
            return Err(StorageError::Missing(id.to_string()));
        };

        if record.first_used {
            return Ok(false);
        }
        record.first_used = true;
        Ok(true)
    }

    async fn has_visited(&self, id: RedirectId, visitor: &VisitorId) -> Result<bool> {
        Ok(self
            .state
            .visits
            .contains_key(&Self::visit_key(id, visitor)))
    }

    async fn record_visit(&self, id: RedirectId, visitor: &VisitorId) -> Result<()> {
        // Holding the record guard keeps a concurrent delete from removing
        // the record between the parent check and the ledger insert.
        let Some(_parent) = self.state.records.get(&id) else {
            return Err(StorageError::Missing(id.to_string()));
        };

        match self.state.visits.entry(Self::visit_key(id, visitor)) {
            Entry::Occupied(_) => Err(StorageError::Conflict(format!("{id}/{visitor}"))),
            Entry::Vacant(vacant) => {
                vacant.insert(Timestamp::now());
                Ok(())
            }
        }
    }
}
