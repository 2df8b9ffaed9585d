//! Core types and traits for the Firstlink redirector.
//!
//! This crate provides the domain types, the store contracts, and the
//! admin contract shared by the resolution engine, the admin service and
//! the HTTP gateway.

pub mod admin;
pub mod error;
pub mod policy;
pub mod repository;
pub mod slug;
pub mod visitor;

pub use admin::{CreateRedirect, RedirectAdmin};
pub use error::{AdminError, CoreError, StorageError};
pub use policy::FirstVisitPolicy;
pub use repository::{
    NewRedirect, ReadRepository, RedirectId, RedirectRecord, RedirectSummary, Repository,
    ResolutionStore,
};
pub use slug::Slug;
pub use visitor::{VisitorId, LOOPBACK_IDENTITY};
