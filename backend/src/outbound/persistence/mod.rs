//! PostgreSQL persistence adapter using Diesel.
//!
//! Implements the repository and transaction ports with `diesel-async` on a
//! `bb8` pool. Row structs (`models.rs`) and the schema (`schema.rs`) stay
//! private; only domain types cross the boundary.
//!
//! ```no_run
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! use fittrack::domain::User;
//! use fittrack::outbound::persistence::{
//!     DbPool, DieselRepository, PgTransactionManager, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/fittrack")).await?;
//! let transactions = PgTransactionManager::new(pool.clone());
//! let users = DieselRepository::<User>::new(pool);
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_repository;
mod diesel_transaction;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_repository::DieselRepository;
pub use diesel_transaction::{PgTransaction, PgTransactionManager};
pub use migrations::{MIGRATIONS, MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
