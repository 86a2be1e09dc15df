//! Ledger service facade
//!
//! The entry point mutation handlers call after their own write succeeded:
//! one method per business event, plus draft posting, reversal and reporting.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use core_kernel::{Currency, HealthCheckResult, JournalEntryId, UserId};
use domain_ledger::{
    AgentBilled, AgentInvoiceReceived, AgentPaymentMade, EntryBuilder, EntryStatus, ExchangeRate,
    ExpenseApproved, ExpensePaid, InvoiceIssued, JournalEntry, JournalEntryWriter, LedgerError,
    LedgerEvent, LedgerPort, PaymentReceived, ReferenceType, TrialBalance,
};
use infra_db::{create_pool, PostgresLedgerAdapter};

use crate::config::LedgerConfig;
use crate::error::ServiceError;

/// Posts business events to the ledger
pub struct LedgerService {
    port: Arc<dyn LedgerPort>,
    writer: JournalEntryWriter,
    auto_post: bool,
}

impl LedgerService {
    /// Creates a service over any [`LedgerPort`]
    pub fn new(port: Arc<dyn LedgerPort>, config: &LedgerConfig) -> Self {
        let writer = JournalEntryWriter::new(Arc::clone(&port), config.base_currency)
            .with_policy(config.unresolved_account_policy);
        Self {
            port,
            writer,
            auto_post: config.auto_post,
        }
    }

    /// Connects to PostgreSQL and builds a service over [`PostgresLedgerAdapter`]
    ///
    /// Migrations are not applied here; run `ledger-migrate` first.
    pub async fn connect(config: &LedgerConfig) -> Result<Self, ServiceError> {
        let pool = create_pool(config.database_config()).await?;
        let port: Arc<dyn LedgerPort> = Arc::new(PostgresLedgerAdapter::new(pool));
        Ok(Self::new(port, config))
    }

    pub fn base_currency(&self) -> Currency {
        self.writer.normalizer().base()
    }

    /// Whether [`record`](Self::record) posts immediately
    pub fn auto_post(&self) -> bool {
        self.auto_post
    }

    /// Records an event using the configured auto-post setting
    pub async fn record(
        &self,
        event: impl Into<LedgerEvent>,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record_with(event.into(), self.auto_post, actor).await
    }

    /// Records an event, posting it when `auto_post` is set and leaving a draft otherwise
    #[instrument(skip(self, event), fields(event = event.name(), actor = %actor))]
    pub async fn record_with(
        &self,
        event: LedgerEvent,
        auto_post: bool,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        let draft = event.build(self.writer.normalizer());
        let entry = self.writer.write(draft, auto_post, actor).await?;
        info!(
            event = event.name(),
            entry_number = %entry.entry_number,
            status = %entry.status,
            "Event recorded"
        );
        Ok(entry)
    }

    /// Records an event delivered as JSON, e.g. `{"event":"invoice_issued", ...}`
    pub async fn record_json(
        &self,
        payload: &str,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        let event: LedgerEvent = serde_json::from_str(payload)?;
        self.record(event, actor).await
    }

    pub async fn invoice_issued(
        &self,
        event: InvoiceIssued,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn payment_received(
        &self,
        event: PaymentReceived,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn expense_approved(
        &self,
        event: ExpenseApproved,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn expense_paid(
        &self,
        event: ExpensePaid,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn agent_invoice_received(
        &self,
        event: AgentInvoiceReceived,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn agent_payment_made(
        &self,
        event: AgentPaymentMade,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn agent_billed(
        &self,
        event: AgentBilled,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        self.record(event, actor).await
    }

    pub async fn post_draft(
        &self,
        entry_id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        Ok(self.writer.post_draft(entry_id, actor).await?)
    }

    pub async fn reverse(
        &self,
        entry_id: JournalEntryId,
        reason: &str,
        actor: UserId,
    ) -> Result<JournalEntry, ServiceError> {
        Ok(self.writer.reverse(entry_id, reason, actor).await?)
    }

    /// Entries booked against one originating record, oldest first
    ///
    /// Posting the same event twice is not prevented; callers use this to
    /// detect an earlier entry.
    #[instrument(skip(self))]
    pub async fn entries_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Result<Vec<JournalEntry>, ServiceError> {
        let entries = self
            .port
            .find_entries_by_reference(reference_type, reference_id)
            .await
            .map_err(LedgerError::Persistence)?;
        Ok(entries)
    }

    /// Trial balance over every posted entry, in the base currency
    #[instrument(skip(self))]
    pub async fn trial_balance(&self) -> Result<TrialBalance, ServiceError> {
        let (accounts, entries) = tokio::try_join!(
            self.port.list_accounts(),
            self.port.list_entries(Some(EntryStatus::Posted)),
        )
        .map_err(LedgerError::Persistence)?;

        Ok(TrialBalance::from_entries(&accounts, &entries, self.base_currency())?)
    }

    /// Latest recorded rate from `currency` to the base currency
    ///
    /// Always `1` for the base currency itself.
    #[instrument(skip(self))]
    pub async fn current_rate(&self, currency: Currency) -> Result<ExchangeRate, ServiceError> {
        let base = self.base_currency();
        if currency == base {
            return Ok(ExchangeRate::ONE);
        }

        let rate = self
            .port
            .latest_exchange_rate(currency, base)
            .await
            .map_err(LedgerError::Persistence)?
            .ok_or(LedgerError::ExchangeRateUnavailable(currency))?;

        Ok(ExchangeRate::new(currency, rate)?)
    }

    pub async fn health(&self) -> HealthCheckResult {
        self.port.health_check().await
    }
}

impl fmt::Debug for LedgerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerService")
            .field("writer", &self.writer)
            .field("auto_post", &self.auto_post)
            .finish()
    }
}
