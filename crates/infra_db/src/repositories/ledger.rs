//! Ledger repository implementation
//!
//! Database access for the chart of accounts, journal entries with their
//! lines, exchange rates and the journal number sequence. Queries are built
//! at runtime (`query_as` + `FromRow`) so the crate compiles without a live
//! database.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Account type for chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

/// Journal entry lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "journal_status", rename_all = "snake_case")]
pub enum JournalStatus {
    Draft,
    Posted,
}

/// Originating record kind of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "journal_reference_type", rename_all = "snake_case")]
pub enum ReferenceType {
    Invoice,
    Payment,
    Expense,
    Adjustment,
}

/// Database row for `chart_of_accounts`
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub account_category: Option<String>,
    pub parent_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Database row for `journal_entries`
#[derive(Debug, Clone, FromRow)]
pub struct JournalEntryRow {
    pub id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
    pub status: JournalStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub posted_by: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Database row for `journal_lines`
#[derive(Debug, Clone, FromRow)]
pub struct JournalLineRow {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub line_number: i32,
    pub account_id: Uuid,
    pub description: Option<String>,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub currency: String,
    pub exchange_rate: Decimal,
    pub base_amount: Decimal,
}

const ACCOUNT_COLUMNS: &str = "id, account_code, account_name, account_type, account_category, \
     parent_id, description, is_active";

const ENTRY_COLUMNS: &str = "id, entry_number, entry_date, description, reference_type, \
     reference_id, status, posted_at, posted_by, created_by, created_at";

const LINE_COLUMNS: &str = "id, journal_entry_id, line_number, account_id, description, \
     debit_amount, credit_amount, TRIM(currency) AS currency, exchange_rate, base_amount";

/// Repository for the double-entry ledger tables
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // -------------------------------------------------------------------------
    // Chart of accounts
    // -------------------------------------------------------------------------

    pub async fn find_account_by_code(
        &self,
        code: &str,
    ) -> Result<Option<AccountRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM chart_of_accounts WHERE account_code = $1",
            ACCOUNT_COLUMNS
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM chart_of_accounts ORDER BY account_code",
            ACCOUNT_COLUMNS
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Inserts an account; used for bank accounts added outside the standard chart
    pub async fn insert_account(&self, account: &AccountRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO chart_of_accounts (
                id, account_code, account_name, account_type, account_category,
                parent_id, description, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(account.id)
        .bind(&account.account_code)
        .bind(&account.account_name)
        .bind(account.account_type)
        .bind(&account.account_category)
        .bind(account.parent_id)
        .bind(&account.description)
        .bind(account.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Journal entries
    // -------------------------------------------------------------------------

    /// Next value of the journal number sequence, e.g. `JE-000042`
    pub async fn next_entry_number(&self) -> Result<String, DatabaseError> {
        let number = sqlx::query_scalar::<_, String>("SELECT generate_journal_number()")
            .fetch_one(&self.pool)
            .await?;
        Ok(number)
    }

    /// Creates a journal entry with its lines in a single transaction
    ///
    /// Either the header and every line are committed, or nothing is.
    pub async fn insert_entry(
        &self,
        entry: &JournalEntryRow,
        lines: &[JournalLineRow],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO journal_entries (
                id, entry_number, entry_date, description, reference_type,
                reference_id, status, posted_at, posted_by, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.entry_number)
        .bind(entry.entry_date)
        .bind(&entry.description)
        .bind(entry.reference_type)
        .bind(entry.reference_id)
        .bind(entry.status)
        .bind(entry.posted_at)
        .bind(entry.posted_by)
        .bind(entry.created_by)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        if !lines.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO journal_lines (id, journal_entry_id, line_number, account_id, \
                 description, debit_amount, credit_amount, currency, exchange_rate, base_amount) ",
            );
            builder.push_values(lines, |mut row, line| {
                row.push_bind(line.id)
                    .push_bind(line.journal_entry_id)
                    .push_bind(line.line_number)
                    .push_bind(line.account_id)
                    .push_bind(&line.description)
                    .push_bind(line.debit_amount)
                    .push_bind(line.credit_amount)
                    .push_bind(&line.currency)
                    .push_bind(line.exchange_rate)
                    .push_bind(line.base_amount);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_entry(&self, id: Uuid) -> Result<Option<JournalEntryRow>, DatabaseError> {
        let sql = format!("SELECT {} FROM journal_entries WHERE id = $1", ENTRY_COLUMNS);
        let row = sqlx::query_as::<_, JournalEntryRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Entries for an originating record, oldest first
    pub async fn find_entries_by_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Result<Vec<JournalEntryRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM journal_entries \
             WHERE reference_type = $1 AND reference_id = $2 \
             ORDER BY created_at, entry_number",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, JournalEntryRow>(&sql)
            .bind(reference_type)
            .bind(reference_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All entries, optionally filtered by status, oldest first
    pub async fn list_entries(
        &self,
        status: Option<JournalStatus>,
    ) -> Result<Vec<JournalEntryRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM journal_entries \
             WHERE ($1::journal_status IS NULL OR status = $1) \
             ORDER BY created_at, entry_number",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query_as::<_, JournalEntryRow>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Lines of the given entries, in entry then line order
    pub async fn lines_for_entries(
        &self,
        entry_ids: &[Uuid],
    ) -> Result<Vec<JournalLineRow>, DatabaseError> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM journal_lines \
             WHERE journal_entry_id = ANY($1) \
             ORDER BY journal_entry_id, line_number",
            LINE_COLUMNS
        );
        let rows = sqlx::query_as::<_, JournalLineRow>(&sql)
            .bind(entry_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Moves a draft entry to posted
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` if no entry has `id`
    /// - `DatabaseError::Conflict` if the entry is already posted
    pub async fn mark_posted(
        &self,
        id: Uuid,
        posted_by: Uuid,
        posted_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE journal_entries
            SET status = 'posted', posted_by = $2, posted_at = $3
            WHERE id = $1 AND status = 'draft'
            "#,
        )
        .bind(id)
        .bind(posted_by)
        .bind(posted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_entry(id).await? {
                Some(entry) => Err(DatabaseError::Conflict(format!(
                    "journal entry {} is already posted",
                    entry.entry_number
                ))),
                None => Err(DatabaseError::not_found("JournalEntry", id)),
            };
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Exchange rates
    // -------------------------------------------------------------------------

    /// Most recent rate for the currency pair
    pub async fn latest_exchange_rate(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Option<Decimal>, DatabaseError> {
        let rate = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT rate FROM exchange_rates
            WHERE from_currency = $1 AND to_currency = $2
            ORDER BY effective_date DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rate)
    }

    pub async fn insert_exchange_rate(
        &self,
        from: &str,
        to: &str,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO exchange_rates (from_currency, to_currency, rate, effective_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(rate)
        .bind(effective_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
