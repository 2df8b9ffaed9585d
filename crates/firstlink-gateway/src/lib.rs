//! HTTP surface for the Firstlink redirector.
//!
//! `GET /{slug}` answers with a `302 Found` to the destination chosen by the
//! resolution engine. The admin JSON API under `/api/redirects` creates,
//! lists and deletes redirect records.

pub mod app;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod model;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use identity::extract_identity;
pub use state::AppState;
