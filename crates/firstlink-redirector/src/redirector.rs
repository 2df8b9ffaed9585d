use crate::Result;
use async_trait::async_trait;
use firstlink_core::{Slug, VisitorId};

/// The destination chosen for one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub destination: String,
    /// Whether this resolution consumed the first visit.
    pub first_visit: bool,
}

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a slug to the URL the caller should be sent to, recording
    /// first-use state as a side effect.
    ///
    /// `visitor` is only consulted by the per-visitor policy.
    async fn resolve(&self, slug: &Slug, visitor: Option<&VisitorId>) -> Result<Resolution>;
}
