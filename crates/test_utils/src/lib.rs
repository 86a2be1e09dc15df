//! Test Utilities Crate
//!
//! Shared fixtures, builders, assertions and generators for the freight
//! ledger test suites, plus a containerised PostgreSQL for adapter tests.
//!
//! # Modules
//!
//! - `fixtures`: deterministic amounts, rates, dates, ids and events
//! - `builders`: event and account builders with defaults
//! - `database`: testcontainers PostgreSQL with the ledger migrations applied
//! - `assertions`: journal entry assertions
//! - `generators`: proptest strategies

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
