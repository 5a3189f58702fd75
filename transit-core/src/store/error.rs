use std::path::PathBuf;

use rusqlite::{Error as SqliteError, ErrorCode};
use thiserror::Error;

/// Errors raised by [`crate::store::TransitDatabase`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// `connect` was called while a connection was already open.
    #[error("a connection to {path:?} is already open")]
    AlreadyConnected {
        /// Location of the SQLite database.
        path: PathBuf,
    },
    /// An operation needed an open connection but none was present.
    #[error("no open database connection; call connect first")]
    NotConnected,
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Location of the SQLite database.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Enabling SQLite foreign keys failed.
    #[error("failed to enable SQLite foreign keys")]
    ForeignKeys {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating a table or index failed.
    #[error("failed to execute schema step '{step}'")]
    Schema {
        /// Name of the schema step that failed.
        step: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A write violated a primary key, foreign key or uniqueness constraint.
    ///
    /// The transaction has already been rolled back when this is returned.
    #[error("constraint violated while trying to {operation} ({record})")]
    Constraint {
        /// Operation that was running.
        operation: &'static str,
        /// Row being written, e.g. `stop 7`.
        record: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Any other SQLite failure.
    #[error("failed to {operation}")]
    Sqlite {
        /// Operation that was running.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// The bus line has no persisted route rows.
    #[error("no route is stored for bus line {bus_line_id}")]
    RouteNotFound {
        /// Identifier of the bus line that was looked up.
        bus_line_id: u32,
    },
    /// Closing the connection failed.
    #[error("failed to close SQLite database at {path:?}")]
    Close {
        /// Location of the SQLite database.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

impl StoreError {
    /// Whether this error reports a violated constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Constraint { .. })
    }

    pub(super) fn sqlite(operation: &'static str) -> impl FnOnce(SqliteError) -> Self {
        move |source| Self::Sqlite { operation, source }
    }

    pub(super) fn write(
        operation: &'static str,
        record: String,
    ) -> impl FnOnce(SqliteError) -> Self {
        move |source| {
            if violates_constraint(&source) {
                Self::Constraint {
                    operation,
                    record,
                    source,
                }
            } else {
                Self::Sqlite { operation, source }
            }
        }
    }
}

fn violates_constraint(error: &SqliteError) -> bool {
    matches!(
        error,
        SqliteError::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}
