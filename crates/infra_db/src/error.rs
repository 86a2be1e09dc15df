//! Database error types
//!
//! SQLx errors are classified by PostgreSQL error code on the way in, and
//! translated into [`PortError`] at the adapter boundary.

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation (e.g. a reused entry number)
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation (e.g. a line against an unknown account)
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The row exists but is not in a state that allows the change
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be mapped to a domain value
    #[error("Invalid stored value: {0}")]
    InvalidData(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
        )
    }

    /// Checks if this error is a connection-related issue
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => {
                DatabaseError::QueryFailed("expected row not returned".to_string())
            }
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolClosed => {
                DatabaseError::ConnectionFailed(error.to_string())
            }
            sqlx::Error::Database(db_err) => {
                // https://www.postgresql.org/docs/current/errcodes-appendix.html
                let message = db_err.message().to_string();
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry(message),
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23514") => DatabaseError::ConstraintViolation(message),
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DatabaseError::InvalidData(error.to_string())
            }
            _ => DatabaseError::QueryFailed(error.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
            DatabaseError::DuplicateEntry(msg) | DatabaseError::Conflict(msg) => {
                PortError::conflict(msg)
            }
            DatabaseError::ForeignKeyViolation(msg) | DatabaseError::ConstraintViolation(msg) => {
                PortError::validation(msg)
            }
            DatabaseError::ConnectionFailed(msg) => PortError::connection(msg),
            DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
                service: "postgres connection pool".to_string(),
            },
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
