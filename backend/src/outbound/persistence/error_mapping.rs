//! Classification of Diesel failures shared by every repository.
//!
//! Repositories turn a [`DieselFailure`] into their own port error; only the
//! variants a port cares about need special handling.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Coarse category of a failed Diesel operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(String),
    /// A unique constraint rejected the write; carries the constraint name.
    UniqueViolation(Option<String>),
    /// A foreign key rejected the write; carries the constraint name.
    ForeignKeyViolation(Option<String>),
    /// Anything else.
    Query(String),
}

impl DieselFailure {
    /// Message for connection and query variants.
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Connection(message) | Self::Query(message) => message,
            Self::UniqueViolation(constraint) => {
                format!("unique constraint violated: {}", constraint.unwrap_or_default())
            }
            Self::ForeignKeyViolation(constraint) => {
                format!("foreign key violated: {}", constraint.unwrap_or_default())
            }
        }
    }
}

/// Classify a Diesel error, logging the raw cause at debug level.
pub(crate) fn classify(error: DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection(info.message().to_owned())
                }
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation(constraint),
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation(constraint)
                }
                _ => DieselFailure::Query(info.message().to_owned()),
            }
        }
        DieselError::NotFound => DieselFailure::Query("record not found".to_owned()),
        other => {
            let message = other.to_string();
            debug!(error = %message, "diesel operation failed");
            DieselFailure::Query(message)
        }
    }
}

/// Map a failure to a port error with connection and query constructors.
///
/// Constraint violations without a dedicated port variant become query
/// errors.
pub(crate) fn map_basic<E>(
    failure: DieselFailure,
    connection: impl FnOnce(String) -> E,
    query: impl FnOnce(String) -> E,
) -> E {
    match failure {
        DieselFailure::Connection(message) => connection(message),
        other => query(other.into_message()),
    }
}
