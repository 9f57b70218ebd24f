//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local tables with transactional staging
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **security**: Argon2id password hashing
//!
//! Adapters translate between domain types and storage representations and
//! contain no business logic.

pub mod memory;
pub mod persistence;
pub mod security;
