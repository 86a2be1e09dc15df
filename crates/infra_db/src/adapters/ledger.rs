//! PostgreSQL Ledger Adapter
//!
//! Implements [`LedgerPort`] on top of [`LedgerRepository`], translating
//! between domain types and database rows and turning `DatabaseError` into
//! `PortError`.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerAdapter;
//! use domain_ledger::{JournalEntryWriter, LedgerPort};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn LedgerPort> = Arc::new(PostgresLedgerAdapter::new(pool));
//! let writer = JournalEntryWriter::new(port, Currency::TZS);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AccountId, AdapterHealth, Currency, DomainPort, HealthCheckResult, HealthCheckable,
    JournalEntryId, JournalLineId, PortError, UserId,
};
use domain_ledger::{
    Account, AccountCategory, AccountType, EntryStatus, JournalEntry, JournalLine, LedgerPort,
    ReferenceType,
};

use crate::error::DatabaseError;
use crate::repositories::ledger::{
    AccountRow, AccountType as DbAccountType, JournalEntryRow, JournalLineRow,
    JournalStatus as DbJournalStatus, LedgerRepository, ReferenceType as DbReferenceType,
};

const ADAPTER_ID: &str = "postgres-ledger-adapter";

/// PostgreSQL-backed implementation of the LedgerPort trait
///
/// Entry numbers come from the `generate_journal_number()` database
/// function; headers and lines are written in one transaction.
#[derive(Debug, Clone)]
pub struct PostgresLedgerAdapter {
    repository: LedgerRepository,
}

impl PostgresLedgerAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LedgerRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }

    async fn attach_lines(
        &self,
        rows: Vec<JournalEntryRow>,
    ) -> Result<Vec<JournalEntry>, PortError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut lines_by_entry: HashMap<Uuid, Vec<JournalLineRow>> = HashMap::new();
        for line in self.repository.lines_for_entries(&ids).await? {
            lines_by_entry.entry(line.journal_entry_id).or_default().push(line);
        }

        rows.into_iter()
            .map(|row| {
                let lines = lines_by_entry.remove(&row.id).unwrap_or_default();
                row_to_entry(row, lines)
            })
            .collect::<Result<Vec<_>, DatabaseError>>()
            .map_err(PortError::from)
    }
}

impl DomainPort for PostgresLedgerAdapter {}

#[async_trait]
impl HealthCheckable for PostgresLedgerAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.repository.pool())
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl LedgerPort for PostgresLedgerAdapter {
    #[instrument(skip(self))]
    async fn find_account_by_code(&self, code: &str) -> Result<Option<Account>, PortError> {
        let row = self.repository.find_account_by_code(code).await?;
        Ok(row.map(row_to_account))
    }

    #[instrument(skip(self))]
    async fn list_accounts(&self) -> Result<Vec<Account>, PortError> {
        let rows = self.repository.list_accounts().await?;
        Ok(rows.into_iter().map(row_to_account).collect())
    }

    #[instrument(skip(self))]
    async fn next_entry_number(&self) -> Result<String, PortError> {
        let number = self.repository.next_entry_number().await?;
        debug!(entry_number = %number, "Generated journal number");
        Ok(number)
    }

    #[instrument(
        skip(self, entry),
        fields(entry_number = %entry.entry_number, lines = entry.lines.len())
    )]
    async fn insert_entry(&self, entry: &JournalEntry) -> Result<(), PortError> {
        let (header, lines) = entry_to_rows(entry);
        self.repository.insert_entry(&header, &lines).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn get_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, PortError> {
        match self.repository.get_entry(*id.as_uuid()).await? {
            Some(row) => Ok(self.attach_lines(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_entries_by_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Result<Vec<JournalEntry>, PortError> {
        let rows = self
            .repository
            .find_entries_by_reference(reference_type_to_db(reference_type), reference_id)
            .await?;
        self.attach_lines(rows).await
    }

    #[instrument(skip(self))]
    async fn list_entries(
        &self,
        status: Option<EntryStatus>,
    ) -> Result<Vec<JournalEntry>, PortError> {
        let rows = self.repository.list_entries(status.map(status_to_db)).await?;
        self.attach_lines(rows).await
    }

    #[instrument(skip(self), fields(entry_id = %id))]
    async fn mark_posted(
        &self,
        id: JournalEntryId,
        posted_by: UserId,
        posted_at: DateTime<Utc>,
    ) -> Result<(), PortError> {
        self.repository
            .mark_posted(*id.as_uuid(), *posted_by.as_uuid(), posted_at)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_exchange_rate(
        &self,
        from: Currency,
        to: Currency,
    ) -> Result<Option<Decimal>, PortError> {
        Ok(self.repository.latest_exchange_rate(from.code(), to.code()).await?)
    }
}

// =============================================================================
// Row conversions
// =============================================================================

fn account_type_from_db(t: DbAccountType) -> AccountType {
    match t {
        DbAccountType::Asset => AccountType::Asset,
        DbAccountType::Liability => AccountType::Liability,
        DbAccountType::Equity => AccountType::Equity,
        DbAccountType::Revenue => AccountType::Revenue,
        DbAccountType::Expense => AccountType::Expense,
    }
}

fn account_type_to_db(t: AccountType) -> DbAccountType {
    match t {
        AccountType::Asset => DbAccountType::Asset,
        AccountType::Liability => DbAccountType::Liability,
        AccountType::Equity => DbAccountType::Equity,
        AccountType::Revenue => DbAccountType::Revenue,
        AccountType::Expense => DbAccountType::Expense,
    }
}

fn status_to_db(s: EntryStatus) -> DbJournalStatus {
    match s {
        EntryStatus::Draft => DbJournalStatus::Draft,
        EntryStatus::Posted => DbJournalStatus::Posted,
    }
}

fn status_from_db(s: DbJournalStatus) -> EntryStatus {
    match s {
        DbJournalStatus::Draft => EntryStatus::Draft,
        DbJournalStatus::Posted => EntryStatus::Posted,
    }
}

fn reference_type_to_db(r: ReferenceType) -> DbReferenceType {
    match r {
        ReferenceType::Invoice => DbReferenceType::Invoice,
        ReferenceType::Payment => DbReferenceType::Payment,
        ReferenceType::Expense => DbReferenceType::Expense,
        ReferenceType::Adjustment => DbReferenceType::Adjustment,
    }
}

fn reference_type_from_db(r: DbReferenceType) -> ReferenceType {
    match r {
        DbReferenceType::Invoice => ReferenceType::Invoice,
        DbReferenceType::Payment => ReferenceType::Payment,
        DbReferenceType::Expense => ReferenceType::Expense,
        DbReferenceType::Adjustment => ReferenceType::Adjustment,
    }
}

fn row_to_account(row: AccountRow) -> Account {
    // Unknown category labels map to None
    let category = row
        .account_category
        .as_deref()
        .and_then(|c| c.parse::<AccountCategory>().ok());

    Account {
        id: AccountId::from(row.id),
        code: row.account_code,
        name: row.account_name,
        account_type: account_type_from_db(row.account_type),
        category,
        parent_id: row.parent_id.map(AccountId::from),
        description: row.description,
        is_active: row.is_active,
    }
}

/// Converts a domain account into a row for [`LedgerRepository::insert_account`]
pub fn account_to_row(account: &Account) -> AccountRow {
    AccountRow {
        id: *account.id.as_uuid(),
        account_code: account.code.clone(),
        account_name: account.name.clone(),
        account_type: account_type_to_db(account.account_type),
        account_category: account.category.map(|c| c.as_str().to_string()),
        parent_id: account.parent_id.map(Uuid::from),
        description: account.description.clone(),
        is_active: account.is_active,
    }
}

fn entry_to_rows(entry: &JournalEntry) -> (JournalEntryRow, Vec<JournalLineRow>) {
    let header = JournalEntryRow {
        id: *entry.id.as_uuid(),
        entry_number: entry.entry_number.clone(),
        entry_date: entry.entry_date,
        description: entry.description.clone(),
        reference_type: reference_type_to_db(entry.reference_type),
        reference_id: entry.reference_id,
        status: status_to_db(entry.status),
        posted_at: entry.posted_at,
        posted_by: entry.posted_by.map(Uuid::from),
        created_by: *entry.created_by.as_uuid(),
        created_at: entry.created_at,
    };

    let lines = entry
        .lines
        .iter()
        .zip(1..)
        .map(|(line, line_number)| JournalLineRow {
            id: *line.id.as_uuid(),
            journal_entry_id: *entry.id.as_uuid(),
            line_number,
            account_id: *line.account_id.as_uuid(),
            description: line.description.clone(),
            debit_amount: line.debit_amount,
            credit_amount: line.credit_amount,
            currency: line.currency.code().to_string(),
            exchange_rate: line.exchange_rate,
            base_amount: line.base_amount,
        })
        .collect();

    (header, lines)
}

fn row_to_entry(
    row: JournalEntryRow,
    lines: Vec<JournalLineRow>,
) -> Result<JournalEntry, DatabaseError> {
    let lines = lines
        .into_iter()
        .map(|line| {
            let currency = line.currency.parse::<Currency>().map_err(|e| {
                DatabaseError::InvalidData(format!("journal line {}: {}", line.id, e))
            })?;
            Ok(JournalLine {
                id: JournalLineId::from(line.id),
                entry_id: JournalEntryId::from(line.journal_entry_id),
                account_id: AccountId::from(line.account_id),
                description: line.description,
                debit_amount: line.debit_amount,
                credit_amount: line.credit_amount,
                currency,
                exchange_rate: line.exchange_rate,
                base_amount: line.base_amount,
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok(JournalEntry {
        id: JournalEntryId::from(row.id),
        entry_number: row.entry_number,
        entry_date: row.entry_date,
        description: row.description,
        reference_type: reference_type_from_db(row.reference_type),
        reference_id: row.reference_id,
        status: status_from_db(row.status),
        posted_at: row.posted_at,
        posted_by: row.posted_by.map(UserId::from),
        created_by: UserId::from(row.created_by),
        created_at: row.created_at,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain_ledger::FreightChartOfAccounts;
    use rust_decimal_macros::dec;

    fn sample_entry() -> JournalEntry {
        let id = JournalEntryId::new_v7();
        let line = |debit: Decimal, credit: Decimal| JournalLine {
            id: JournalLineId::new_v7(),
            entry_id: id,
            account_id: AccountId::new(),
            description: Some("Freight".into()),
            debit_amount: debit,
            credit_amount: credit,
            currency: Currency::USD,
            exchange_rate: dec!(2500),
            base_amount: dec!(250000),
        };
        JournalEntry {
            id,
            entry_number: "JE-000007".into(),
            entry_date: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            description: "Invoice INV-1 issued".into(),
            reference_type: ReferenceType::Invoice,
            reference_id: Uuid::new_v4(),
            status: EntryStatus::Posted,
            posted_at: Some(Utc::now()),
            posted_by: Some(UserId::new()),
            created_by: UserId::new(),
            created_at: Utc::now(),
            lines: vec![line(dec!(100), Decimal::ZERO), line(Decimal::ZERO, dec!(100))],
        }
    }

    #[test]
    fn test_entry_rows_round_trip() {
        let entry = sample_entry();
        let (header, lines) = entry_to_rows(&entry);

        assert_eq!(header.status, DbJournalStatus::Posted);
        assert_eq!(lines.iter().map(|l| l.line_number).collect::<Vec<_>>(), vec![1, 2]);
        assert!(lines.iter().all(|l| l.currency == "USD"));

        let back = row_to_entry(header, lines).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_unknown_currency_is_invalid_data() {
        let entry = sample_entry();
        let (header, mut lines) = entry_to_rows(&entry);
        lines[0].currency = "XXX".into();

        let err = row_to_entry(header, lines).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidData(_)));
    }

    #[test]
    fn test_account_rows_round_trip() {
        for account in FreightChartOfAccounts::standard_accounts() {
            assert_eq!(row_to_account(account_to_row(&account)), account);
        }
    }

    #[test]
    fn test_unknown_category_is_dropped() {
        let mut row = account_to_row(&FreightChartOfAccounts::standard_accounts()[0]);
        row.account_category = Some("petty_cash".into());
        assert_eq!(row_to_account(row).category, None);
    }
}
