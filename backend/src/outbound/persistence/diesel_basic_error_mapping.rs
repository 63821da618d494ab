//! Shared Diesel error mapping for the Foodgram repositories.
//!
//! Repositories first classify a Diesel failure, then translate the
//! classification into their own port error. Constraint violations carry the
//! constraint name so callers can tell `unique_favorite` from
//! `taboo_self_follow`.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Storage-level outcome of a failed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(&'static str),
    /// A unique constraint rejected the row.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key referenced a missing row.
    ForeignKeyViolation { constraint: Option<String> },
    /// A check constraint rejected the row.
    CheckViolation { constraint: Option<String> },
    /// Any other failure.
    Query(&'static str),
}

impl DieselFailure {
    /// Whether the violated constraint name contains `needle`.
    pub fn constraint_contains(&self, needle: &str) -> bool {
        match self {
            Self::UniqueViolation { constraint }
            | Self::ForeignKeyViolation { constraint }
            | Self::CheckViolation { constraint } => constraint
                .as_deref()
                .is_some_and(|name| name.contains(needle)),
            Self::Connection(_) | Self::Query(_) => false,
        }
    }
}

/// Classify a Diesel error, logging the database message at debug level.
pub fn classify_diesel_error(error: diesel::result::Error) -> DieselFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => {
                    DieselFailure::UniqueViolation { constraint }
                }
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::CheckViolation => DieselFailure::CheckViolation { constraint },
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error")
                }
                _ => DieselFailure::Query("database error"),
            }
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Map Diesel errors where constraint violations need no special meaning.
pub fn map_basic_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => connection(message),
        DieselFailure::Query(message) => query(message),
        DieselFailure::UniqueViolation { .. }
        | DieselFailure::ForeignKeyViolation { .. }
        | DieselFailure::CheckViolation { .. } => query("constraint violation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn constraint_lookup_ignores_non_constraint_failures() {
        assert!(!DieselFailure::Query("boom").constraint_contains("unique"));
        let failure = DieselFailure::CheckViolation {
            constraint: Some("taboo_self_follow".to_owned()),
        };
        assert!(failure.constraint_contains("self_follow"));
    }

    #[rstest]
    fn not_found_maps_to_query() {
        let failure = classify_diesel_error(diesel::result::Error::NotFound);
        assert_eq!(failure, DieselFailure::Query("record not found"));
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let message: String =
            map_basic_pool_error(PoolError::checkout("timed out"), |message| message);
        assert_eq!(message, "timed out");
    }
}
