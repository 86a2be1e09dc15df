//! Ledger Domain Ports
//!
//! The ledger treats its store as an opaque relational backend exposing the
//! chart of accounts, journal entries with their lines, exchange rates, and a
//! sequential entry-number generator. `LedgerPort` is that boundary.
//!
//! - **PostgreSQL adapter**: `infra_db::adapters::PostgresLedgerAdapter`
//! - **Mock adapter**: [`mock::MockLedgerPort`], in memory, for tests
//!
//! ```rust,ignore
//! use domain_ledger::{LedgerPort, JournalEntryWriter};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn LedgerPort> = Arc::new(PostgresLedgerAdapter::new(pool));
//! let writer = JournalEntryWriter::new(port, Currency::TZS);
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use core_kernel::{Currency, DomainPort, HealthCheckable, JournalEntryId, PortError, UserId};

use crate::account::Account;
use crate::journal::{EntryStatus, JournalEntry, ReferenceType};

/// Persistence operations the ledger needs
#[async_trait]
pub trait LedgerPort: DomainPort + HealthCheckable {
    /// Finds an account by its chart-of-accounts code
    async fn find_account_by_code(&self, code: &str) -> Result<Option<Account>, PortError>;

    /// Lists the whole chart of accounts
    async fn list_accounts(&self) -> Result<Vec<Account>, PortError>;

    /// Hands out a new unique entry number
    ///
    /// Must be safe under concurrent callers.
    async fn next_entry_number(&self) -> Result<String, PortError>;

    /// Persists the header and all of its lines, or nothing
    async fn insert_entry(&self, entry: &JournalEntry) -> Result<(), PortError>;

    async fn get_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, PortError>;

    /// All entries pointing at one originating record, oldest first
    async fn find_entries_by_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Result<Vec<JournalEntry>, PortError>;

    /// Lists entries, optionally filtered by status, oldest first
    async fn list_entries(
        &self,
        status: Option<EntryStatus>,
    ) -> Result<Vec<JournalEntry>, PortError>;

    /// Moves a draft entry to posted
    ///
    /// Returns `PortError::Conflict` if the entry is not a draft and
    /// `PortError::NotFound` if it does not exist.
    async fn mark_posted(
        &self,
        id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> Result<(), PortError>;

    /// Most recent recorded rate converting one unit of `from` into `to`
    async fn latest_exchange_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Option<Decimal>, PortError>;
}

/// In-memory implementation of LedgerPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::account::FreightChartOfAccounts;

    /// In-memory ledger store
    ///
    /// Entries are kept in insertion order. The failure switches make the next
    /// calls to `next_entry_number` / `insert_entry` fail until cleared.
    #[derive(Debug, Default)]
    pub struct MockLedgerPort {
        accounts: Arc<RwLock<Vec<Account>>>,
        entries: Arc<RwLock<Vec<JournalEntry>>>,
        rates: Arc<RwLock<HashMap<(Currency, Currency), Decimal>>>,
        sequence: AtomicU64,
        fail_entry_number: AtomicBool,
        fail_insert: AtomicBool,
    }

    impl MockLedgerPort {
        /// Creates an empty store with no accounts
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store seeded with the standard freight chart of accounts
        pub fn with_standard_chart() -> Self {
            Self {
                accounts: Arc::new(RwLock::new(FreightChartOfAccounts::standard_accounts())),
                ..Self::default()
            }
        }

        pub fn with_accounts(accounts: Vec<Account>) -> Self {
            Self {
                accounts: Arc::new(RwLock::new(accounts)),
                ..Self::default()
            }
        }

        pub async fn add_account(&self, account: Account) {
            self.accounts.write().await.push(account);
        }

        /// Removes the account with `code`, returning whether one existed
        pub async fn remove_account(&self, code: &str) -> bool {
            let mut accounts = self.accounts.write().await;
            let before = accounts.len();
            accounts.retain(|a| a.code != code);
            accounts.len() != before
        }

        pub async fn account_by_code(&self, code: &str) -> Option<Account> {
            self.accounts.read().await.iter().find(|a| a.code == code).cloned()
        }

        pub async fn set_exchange_rate(&self, from: Currency, to: Currency, rate: Decimal) {
            self.rates.write().await.insert((from, to), rate);
        }

        pub async fn entry_count(&self) -> usize {
            self.entries.read().await.len()
        }

        pub fn fail_entry_numbers(&self, fail: bool) {
            self.fail_entry_number.store(fail, Ordering::SeqCst);
        }

        pub fn fail_inserts(&self, fail: bool) {
            self.fail_insert.store(fail, Ordering::SeqCst);
        }
    }

    impl DomainPort for MockLedgerPort {}

    #[async_trait]
    impl HealthCheckable for MockLedgerPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-ledger-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl LedgerPort for MockLedgerPort {
        async fn find_account_by_code(&self, code: &str) -> Result<Option<Account>, PortError> {
            Ok(self.account_by_code(code).await)
        }

        async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
            Ok(self.accounts.read().await.clone())
        }

        async fn next_entry_number(&self) -> Result<String, PortError> {
            if self.fail_entry_number.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "generate_journal_number".to_string(),
                });
            }
            let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("JE-{:06}", next))
        }

        async fn insert_entry(&self, entry: &JournalEntry) -> Result<(), PortError> {
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(PortError::internal("journal_lines insert rejected"));
            }
            let mut entries = self.entries.write().await;
            if entries.iter().any(|e| e.id == entry.id || e.entry_number == entry.entry_number) {
                return Err(PortError::conflict(format!(
                    "journal entry {} already exists",
                    entry.entry_number
                )));
            }
            entries.push(entry.clone());
            Ok(())
        }

        async fn get_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, PortError> {
            Ok(self.entries.read().await.iter().find(|e| e.id == id).cloned())
        }

        async fn find_entries_by_reference(
            &self,
            reference_type: ReferenceType,
            reference_id: Uuid,
        ) -> Result<Vec<JournalEntry>, PortError> {
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .filter(|e| e.reference_type == reference_type && e.reference_id == reference_id)
                .cloned()
                .collect())
        }

        async fn list_entries(
            &self,
            status: Option<EntryStatus>,
        ) -> Result<Vec<JournalEntry>, PortError> {
            Ok(self
                .entries
                .read()
                .await
                .iter()
                .filter(|e| status.map_or(true, |s| e.status == s))
                .cloned()
                .collect())
        }

        async fn mark_posted(
            &self,
            id: JournalEntryId,
            posted_by: UserId,
            posted_at: DateTime<Utc>,
        ) -> Result<(), PortError> {
            let mut entries = self.entries.write().await;
            let entry = entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| PortError::not_found("JournalEntry", id))?;
            if entry.status != EntryStatus::Draft {
                return Err(PortError::conflict(format!(
                    "journal entry {} is already posted",
                    entry.entry_number
                )));
            }
            entry.status = EntryStatus::Posted;
            entry.posted_by = Some(posted_by);
            entry.posted_at = Some(posted_at);
            Ok(())
        }

        async fn latest_exchange_rate(
            &self,
            from: Currency,
            to: Currency,
        ) -> Result<Option<Decimal>, PortError> {
            Ok(self.rates.read().await.get(&(from, to)).copied())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockLedgerPort;
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn draft_entry(number: &str, status: EntryStatus) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_number: number.to_string(),
            entry_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: "Test".to_string(),
            reference_type: ReferenceType::Invoice,
            reference_id: Uuid::new_v4(),
            status,
            posted_at: None,
            posted_by: None,
            created_by: UserId::new(),
            created_at: Utc::now(),
            lines: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_entry_numbers_are_sequential() {
        let port = MockLedgerPort::new();
        assert_eq!(port.next_entry_number().await.unwrap(), "JE-000001");
        assert_eq!(port.next_entry_number().await.unwrap(), "JE-000002");
    }

    #[tokio::test]
    async fn test_standard_chart_lookup() {
        let port = MockLedgerPort::with_standard_chart();
        let cash = port.find_account_by_code("1120").await.unwrap().unwrap();
        assert_eq!(cash.name, "Cash - TZS");
        assert!(port.find_account_by_code("0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mark_posted_only_from_draft() {
        let port = MockLedgerPort::new();
        let entry = draft_entry("JE-000001", EntryStatus::Draft);
        port.insert_entry(&entry).await.unwrap();

        let user = UserId::new();
        port.mark_posted(entry.id, user, Utc::now()).await.unwrap();
        let stored = port.get_entry(entry.id).await.unwrap().unwrap();
        assert_eq!(stored.status, EntryStatus::Posted);
        assert_eq!(stored.posted_by, Some(user));

        let again = port.mark_posted(entry.id, user, Utc::now()).await;
        assert!(again.unwrap_err().is_conflict());

        let missing = port.mark_posted(JournalEntryId::new(), user, Utc::now()).await;
        assert!(missing.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_duplicate_entry_number_conflicts() {
        let port = MockLedgerPort::new();
        port.insert_entry(&draft_entry("JE-000001", EntryStatus::Posted)).await.unwrap();
        let result = port.insert_entry(&draft_entry("JE-000001", EntryStatus::Posted)).await;
        assert!(result.unwrap_err().is_conflict());
        assert_eq!(port.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_list_entries_filters_by_status() {
        let port = MockLedgerPort::new();
        port.insert_entry(&draft_entry("JE-000001", EntryStatus::Posted)).await.unwrap();
        port.insert_entry(&draft_entry("JE-000002", EntryStatus::Draft)).await.unwrap();

        assert_eq!(port.list_entries(None).await.unwrap().len(), 2);
        let drafts = port.list_entries(Some(EntryStatus::Draft)).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].entry_number, "JE-000002");
    }

    #[tokio::test]
    async fn test_exchange_rates() {
        let port = MockLedgerPort::new();
        assert!(port.latest_exchange_rate(Currency::USD, Currency::TZS).await.unwrap().is_none());
        port.set_exchange_rate(Currency::USD, Currency::TZS, dec!(2510)).await;
        assert_eq!(
            port.latest_exchange_rate(Currency::USD, Currency::TZS).await.unwrap(),
            Some(dec!(2510))
        );
    }
}
