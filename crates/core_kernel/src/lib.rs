//! Core Kernel - Foundational types shared by the freight ledger crates
//!
//! - Money and ISO 4217 currencies with precise decimal arithmetic
//! - Strongly typed identifiers for accounts, entries and business records
//! - Port infrastructure for the ports-and-adapters layout

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    AccountId, JournalEntryId, JournalLineId, InvoiceId, PaymentId, ExpenseId, AgentInvoiceId,
    AgentBillingId, UserId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
