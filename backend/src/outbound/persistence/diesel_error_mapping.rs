//! Diesel and pool error mapping onto the repository and transaction ports.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{RepositoryError, TransactionError};

use super::pool::PoolError;

/// What a Diesel failure means for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Failure {
    /// The connection is gone or unusable.
    Connection(String),
    /// A uniqueness, foreign key or serialisation conflict.
    Conflict(String),
    /// Anything else.
    Query(String),
}

impl Failure {
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Connection(message) | Self::Conflict(message) | Self::Query(message) => message,
        }
    }
}

pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify a Diesel error, logging the database detail at debug level.
pub(crate) fn classify(error: &DieselError) -> Failure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
            match kind {
                DatabaseErrorKind::UniqueViolation => Failure::Conflict(
                    info.constraint_name()
                        .map_or_else(
                            || "unique constraint violated".to_owned(),
                            |name| format!("unique constraint {name} violated"),
                        ),
                ),
                DatabaseErrorKind::ForeignKeyViolation => {
                    Failure::Conflict("referenced row does not exist".to_owned())
                }
                DatabaseErrorKind::SerializationFailure => {
                    Failure::Conflict("concurrent update conflict".to_owned())
                }
                DatabaseErrorKind::ClosedConnection => {
                    Failure::Connection("database connection error".to_owned())
                }
                _ => Failure::Query("database error".to_owned()),
            }
        }
        DieselError::BrokenTransactionManager => {
            Failure::Connection("transaction state lost".to_owned())
        }
        other => {
            debug!(error = %other, "diesel operation failed");
            Failure::Query("database query error".to_owned())
        }
    }
}

pub(crate) fn map_pool_error(error: PoolError) -> RepositoryError {
    RepositoryError::connection(pool_message(error))
}

pub(crate) fn map_diesel_error(error: DieselError) -> RepositoryError {
    match classify(&error) {
        Failure::Connection(message) => RepositoryError::connection(message),
        Failure::Conflict(message) => RepositoryError::conflict(message),
        Failure::Query(message) => RepositoryError::query(message),
    }
}

/// Map a failed flush or commit; `fallback` builds the stage-specific error.
pub(crate) fn map_finish_error(
    error: DieselError,
    fallback: fn(String) -> TransactionError,
) -> TransactionError {
    match classify(&error) {
        Failure::Conflict(message) => TransactionError::conflict(message),
        Failure::Connection(message) | Failure::Query(message) => fallback(message),
    }
}
