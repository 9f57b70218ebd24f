//! In-memory persistence adapter.
//!
//! Used when no database URL is configured and throughout the test suite.
//! Semantics follow the PostgreSQL adapter: writes require a unit of work,
//! staged writes are private to their transaction until commit, and unique
//! usernames and emails are enforced at flush and again at commit. So are
//! references between rows, like deferred foreign keys. When two
//! transactions update or delete the same row the first to commit wins and
//! the other fails with a conflict.

mod repository;
mod store;
mod table;

pub use repository::InMemoryRepository;
pub use store::{InMemoryStore, MemoryTransaction};
