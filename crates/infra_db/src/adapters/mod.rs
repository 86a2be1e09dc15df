//! Domain Adapters
//!
//! Implementations of domain ports backed by PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerAdapter;
//! use domain_ledger::LedgerPort;
//!
//! let adapter = PostgresLedgerAdapter::new(pool);
//! let account = adapter.find_account_by_code("1210").await?;
//! ```

pub mod ledger;

pub use ledger::{account_to_row, PostgresLedgerAdapter};
