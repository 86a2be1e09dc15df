//! Ledger Domain - Journal Entry Posting
//!
//! Turns freight-forwarding business events into balanced double-entry
//! journal entries, with every line carried in its transaction currency and
//! normalized to the ledger's base currency (TZS by default).
//!
//! # Flow
//!
//! ```text
//! LedgerEvent --EntryBuilder--> EntryDraft --JournalEntryWriter--> JournalEntry
//!                                              |
//!                                              +-- AccountResolver (codes -> ids)
//!                                              +-- CurrencyNormalizer (base amounts)
//!                                              +-- LedgerPort (number, atomic insert)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{EntryBuilder, InvoiceIssued, JournalEntryWriter};
//!
//! let writer = JournalEntryWriter::new(port, Currency::TZS);
//! let draft = InvoiceIssued { /* ... */ }.build(writer.normalizer());
//! let entry = writer.write(draft, true, actor).await?;
//! assert!(entry.is_balanced());
//! ```

pub mod account;
pub mod currency;
pub mod draft;
pub mod error;
pub mod events;
pub mod journal;
pub mod ports;
pub mod resolver;
pub mod trial_balance;
pub mod writer;

pub use account::{
    agent_cost_account_code, cash_account_code, codes, expense_account_code, Account,
    AccountCategory, AccountRef, AccountType, FreightChartOfAccounts,
};
pub use currency::{CurrencyNormalizer, ExchangeRate};
pub use draft::{EntryDraft, LineDraft, PostingSide};
pub use error::LedgerError;
pub use events::{
    AgentBilled, AgentInvoiceReceived, AgentPaymentMade, EntryBuilder, ExpenseApproved, ExpensePaid,
    InvoiceIssued, LedgerEvent, PaymentReceived,
};
pub use journal::{EntryStatus, JournalEntry, JournalLine, ReferenceType};
pub use ports::LedgerPort;
pub use resolver::AccountResolver;
pub use trial_balance::{TrialBalance, TrialBalanceLine};
pub use writer::{JournalEntryWriter, UnresolvedAccountPolicy};
