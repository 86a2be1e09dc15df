//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{Currency, MoneyError, PortError};

/// Errors that can occur while building or persisting journal entries
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The persistence layer could not hand out an entry number.
    /// Nothing has been written when this is returned.
    #[error("Failed to generate journal number: {0}")]
    EntryNumber(#[source] PortError),

    /// One or more account references did not resolve to a ledger account
    #[error("Unresolved accounts: {}", .0.join(", "))]
    UnresolvedAccounts(Vec<String>),

    /// Base-currency debits and credits differ
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    UnbalancedEntry {
        debits: Decimal,
        credits: Decimal,
    },

    /// Exchange rate is non-positive, or not 1 for the base currency
    #[error("Invalid exchange rate {rate} for {currency}")]
    InvalidExchangeRate {
        currency: Currency,
        rate: Decimal,
    },

    /// No exchange rate is recorded for the currency
    #[error("No exchange rate available for {0}")]
    ExchangeRateUnavailable(Currency),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The entry has no lines left to persist
    #[error("Journal entry has no lines")]
    EmptyEntry,

    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    #[error("Journal entry already posted: {0}")]
    EntryAlreadyPosted(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PortError),
}

impl LedgerError {
    /// Returns true if retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LedgerError::EntryNumber(e) | LedgerError::Persistence(e) => e.is_transient(),
            _ => false,
        }
    }
}
