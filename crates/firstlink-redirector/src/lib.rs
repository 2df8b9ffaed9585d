//! Resolution engine for first-visit redirects.
//!
//! [`RedirectorService`] looks a slug up, decides whether this resolution is
//! the first visit under the configured [`FirstVisitPolicy`], records that
//! decision in the store, and returns the destination URL. It holds no state
//! of its own; every guarantee comes from the [`ResolutionStore`] it wraps.
//!
//! # Example
//!
//! ```rust
//! use firstlink_core::{FirstVisitPolicy, NewRedirect, Repository, Slug, VisitorId};
//! use firstlink_redirector::RedirectorService;
//! use firstlink_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = InMemoryRepository::new();
//! repo.insert(NewRedirect {
//!     slug: Slug::new("ABCDE")?,
//!     first_url: "https://a.example".to_string(),
//!     next_url: "https://b.example".to_string(),
//! })
//! .await?;
//!
//! let service = RedirectorService::new(repo, FirstVisitPolicy::PerVisitor);
//! let visitor = VisitorId::new("1.2.3.4");
//! let resolution = service.resolve(&Slug::new("ABCDE")?, Some(&visitor)).await?;
//! assert_eq!(resolution.destination, "https://a.example");
//! # Ok(())
//! # }
//! ```
//!
//! [`FirstVisitPolicy`]: firstlink_core::FirstVisitPolicy
//! [`ResolutionStore`]: firstlink_core::ResolutionStore

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::{Redirector, Resolution};
pub use service::RedirectorService;
