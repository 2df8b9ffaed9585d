//! Admin collaborator for redirect records.
//!
//! Creation, listing and deletion live here. The resolution engine never
//! calls into this crate, and this crate never touches first-use state.

pub mod service;

pub use firstlink_core::{AdminError, CreateRedirect, RedirectAdmin};
pub use service::{AdminService, RESERVED_SLUGS};
