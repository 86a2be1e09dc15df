//! Service-level errors

use thiserror::Error;

use domain_ledger::LedgerError;
use infra_db::DatabaseError;

/// Errors returned by [`crate::LedgerService`] and the binaries
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid event payload: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

impl ServiceError {
    /// Returns true if retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Ledger(e) => e.is_transient(),
            ServiceError::Database(e) => e.is_connection_error(),
            ServiceError::Config(_) | ServiceError::InvalidEvent(_) => false,
        }
    }
}
