//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the freight ledger using SQLx: connection pool,
//! schema migrations, the ledger repository and the `LedgerPort` adapter.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/freight_ledger")).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresLedgerAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresLedgerAdapter;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::LedgerRepository;
