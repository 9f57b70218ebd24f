//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, transactions, hashing) describe what the
//! domain needs from adapters. Driving ports (use cases) describe what the
//! domain offers inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod password_hasher;
mod repository;
mod transaction;
mod use_case;

#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{FixturePasswordHasher, PasswordHashError, PasswordHasher};
pub use repository::{
    BodyTrackRepository, ExerciseSetRepository, Projection, ProjectingRepository, Repository,
    RepositoryError, UserRepository, WorkoutPlanRepository, WorkoutSessionRepository,
};
pub use transaction::{TransactionError, TransactionManager};
#[cfg(test)]
pub use use_case::{MockCheapValidator, MockMutationUseCase, MockQueryUseCase};
pub use use_case::{CheapValidator, MutationUseCase, NoCheapChecks, QueryUseCase};
