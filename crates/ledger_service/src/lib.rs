//! Ledger Service - application layer for the freight ledger
//!
//! Wires configuration, tracing and the PostgreSQL adapter to the posting
//! logic in `domain_ledger`. Mutation handlers call [`LedgerService`] once their
//! own write has succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_service::{LedgerConfig, LedgerService};
//!
//! let config = LedgerConfig::from_env()?;
//! let ledger = LedgerService::connect(&config).await?;
//! let entry = ledger.invoice_issued(event, actor).await?;
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

pub use config::LedgerConfig;
pub use error::ServiceError;
pub use service::LedgerService;
pub use telemetry::init_tracing;
