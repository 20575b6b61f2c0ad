//! Shared Diesel error mapping for the journey repositories.
//!
//! Every repository port exposes `Connection` and `Query` variants; these
//! helpers route pool and Diesel failures into them with the failing
//! operation named in the message.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map Diesel errors into query/connection constructors.
///
/// Closed connections surface as connection errors so services report them
/// as temporarily unavailable; everything else is a query failure.
pub(crate) fn map_diesel_error<E>(
    error: DieselError,
    operation: &'static str,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), operation, "diesel operation failed");
        }
        other => debug!(error = %other, operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection(format!("{operation}: database connection closed"))
        }
        DieselError::NotFound => query(format!("{operation}: record not found")),
        DieselError::QueryBuilderError(_) => query(format!("{operation}: invalid query")),
        DieselError::DeserializationError(err) => {
            query(format!("{operation}: row decode failed: {err}"))
        }
        _ => query(format!("{operation}: database error")),
    }
}
