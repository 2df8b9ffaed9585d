//! Store implementations for redirect records and the visit ledger.

pub mod memory;
pub mod mysql;

pub use firstlink_core::repository::{ReadRepository, Repository, ResolutionStore};
pub use firstlink_core::StorageError;
pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
