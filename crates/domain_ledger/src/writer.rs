//! Journal entry writer
//!
//! Turns an [`EntryDraft`] into a persisted [`JournalEntry`]:
//!
//! 1. validate amounts and exchange rates
//! 2. resolve every account reference (concurrently) before any write
//! 3. compute base-currency amounts and check the entry balances
//! 4. take a sequential entry number from the store
//! 5. persist header and lines in one atomic call
//!
//! The acting user is passed explicitly on every call.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use core_kernel::{AccountId, Currency, JournalEntryId, JournalLineId, UserId};

use crate::draft::{EntryDraft, LineDraft, PostingSide};
use crate::currency::CurrencyNormalizer;
use crate::error::LedgerError;
use crate::journal::{base_totals, EntryStatus, JournalEntry, JournalLine, ReferenceType};
use crate::ports::LedgerPort;
use crate::resolver::AccountResolver;

/// What to do with a line whose account reference does not resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedAccountPolicy {
    /// Fail the whole entry and write nothing
    #[default]
    Reject,
    /// Drop the line with a warning and persist the rest
    SkipLine,
}

/// Creates, posts and reverses journal entries
#[derive(Clone)]
pub struct JournalEntryWriter {
    port: Arc<dyn LedgerPort>,
    normalizer: CurrencyNormalizer,
    policy: UnresolvedAccountPolicy,
}

impl JournalEntryWriter {
    pub fn new(port: Arc<dyn LedgerPort>, base_currency: Currency) -> Self {
        Self {
            port,
            normalizer: CurrencyNormalizer::new(base_currency),
            policy: UnresolvedAccountPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnresolvedAccountPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn normalizer(&self) -> &CurrencyNormalizer {
        &self.normalizer
    }

    pub fn policy(&self) -> UnresolvedAccountPolicy {
        self.policy
    }

    /// Resolves, numbers and persists `draft`
    ///
    /// With `auto_post` the entry is stored as posted and stamped with `actor`
    /// and the current time; otherwise it is stored as a draft.
    ///
    /// # Errors
    ///
    /// - `EmptyEntry`, `InvalidAmount`, `InvalidExchangeRate` for bad drafts
    /// - `UnresolvedAccounts` under [`UnresolvedAccountPolicy::Reject`]
    /// - `UnbalancedEntry` when base-currency debits and credits differ
    /// - `EntryNumber` when numbering fails (nothing written)
    /// - `Persistence` when the insert fails (nothing written)
    #[instrument(
        skip(self, draft),
        fields(
            reference_type = %draft.reference_type,
            reference_id = %draft.reference_id,
            lines = draft.lines.len(),
        )
    )]
    pub async fn write(
        &self,
        draft: EntryDraft,
        auto_post: bool,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        self.validate(&draft)?;

        let resolved = AccountResolver::new(self.port.as_ref())
            .resolve_all(&draft.account_refs())
            .await?;

        let mut staged: Vec<(&LineDraft, AccountId)> = Vec::with_capacity(draft.lines.len());
        let mut unresolved = Vec::new();
        for (line, account_id) in draft.lines.iter().zip(resolved) {
            match account_id {
                Some(id) => staged.push((line, id)),
                None => unresolved.push(line.account.to_string()),
            }
        }

        if !unresolved.is_empty() {
            match self.policy {
                UnresolvedAccountPolicy::Reject => {
                    return Err(LedgerError::UnresolvedAccounts(unresolved));
                }
                UnresolvedAccountPolicy::SkipLine => {
                    for account in &unresolved {
                        warn!(account = %account, "Account not found, dropping journal line");
                    }
                }
            }
        }
        if staged.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        let entry_id = JournalEntryId::new_v7();
        let lines = staged
            .into_iter()
            .map(|(line, account_id)| self.stage_line(entry_id, line, account_id))
            .collect::<Result<Vec<_>, _>>()?;

        let (debits, credits) = base_totals(&lines);
        if debits != credits {
            if unresolved.is_empty() {
                return Err(LedgerError::UnbalancedEntry { debits, credits });
            }
            warn!(%debits, %credits, "Journal entry unbalanced after dropping lines");
        }

        let entry_number = self
            .port
            .next_entry_number()
            .await
            .map_err(LedgerError::EntryNumber)?;

        let now = Utc::now();
        let (status, posted_at, posted_by) = if auto_post {
            (EntryStatus::Posted, Some(now), Some(actor))
        } else {
            (EntryStatus::Draft, None, None)
        };

        let entry = JournalEntry {
            id: entry_id,
            entry_number,
            entry_date: draft.entry_date,
            description: draft.description,
            reference_type: draft.reference_type,
            reference_id: draft.reference_id,
            status,
            posted_at,
            posted_by,
            created_by: actor,
            created_at: now,
            lines,
        };

        self.port.insert_entry(&entry).await?;

        info!(
            entry_number = %entry.entry_number,
            status = %entry.status,
            lines = entry.lines.len(),
            "Journal entry created"
        );
        Ok(entry)
    }

    /// Moves a draft entry to posted
    #[instrument(skip(self), fields(entry_id = %entry_id))]
    pub async fn post_draft(
        &self,
        entry_id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let mut entry = self
            .port
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;

        if entry.is_posted() {
            return Err(LedgerError::EntryAlreadyPosted(entry.entry_number));
        }

        let posted_at = Utc::now();
        self.port
            .mark_posted(entry_id, actor, posted_at)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    LedgerError::EntryAlreadyPosted(entry.entry_number.clone())
                } else {
                    LedgerError::Persistence(e)
                }
            })?;

        entry.status = EntryStatus::Posted;
        entry.posted_at = Some(posted_at);
        entry.posted_by = Some(actor);

        info!(entry_number = %entry.entry_number, "Journal entry posted");
        Ok(entry)
    }

    /// Creates a posted entry that offsets a posted entry line by line
    ///
    /// The reversal references the original entry with reference type
    /// `adjustment`; the original is left untouched.
    #[instrument(skip(self, reason), fields(entry_id = %entry_id))]
    pub async fn reverse(
        &self,
        entry_id: JournalEntryId,
        reason: &str,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let original = self
            .port
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;

        if !original.is_posted() {
            return Err(LedgerError::InvalidOperation(format!(
                "only posted entries can be reversed, {} is a draft",
                original.entry_number
            )));
        }

        let reversal_id = JournalEntryId::new_v7();
        let lines = original
            .lines
            .iter()
            .map(|line| JournalLine {
                id: JournalLineId::new_v7(),
                entry_id: reversal_id,
                account_id: line.account_id,
                description: Some(format!("Reversal: {}", reason)),
                debit_amount: line.credit_amount,
                credit_amount: line.debit_amount,
                currency: line.currency,
                exchange_rate: line.exchange_rate,
                base_amount: line.base_amount,
            })
            .collect();

        let entry_number = self
            .port
            .next_entry_number()
            .await
            .map_err(LedgerError::EntryNumber)?;

        let now = Utc::now();
        let reversal = JournalEntry {
            id: reversal_id,
            entry_number,
            entry_date: now.date_naive(),
            description: format!("Reversal of {}: {}", original.entry_number, reason),
            reference_type: ReferenceType::Adjustment,
            reference_id: *original.id.as_uuid(),
            status: EntryStatus::Posted,
            posted_at: Some(now),
            posted_by: Some(actor),
            created_by: actor,
            created_at: now,
            lines,
        };

        self.port.insert_entry(&reversal).await?;

        info!(
            original = %original.entry_number,
            reversal = %reversal.entry_number,
            "Journal entry reversed"
        );
        Ok(reversal)
    }

    fn validate(&self, draft: &EntryDraft) -> Result<(), LedgerError> {
        if draft.lines.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }
        for (index, line) in draft.lines.iter().enumerate() {
            if !line.amount.is_positive() {
                return Err(LedgerError::InvalidAmount(format!(
                    "line {} ({}) must carry a positive amount, got {}",
                    index + 1,
                    line.account,
                    line.amount.amount()
                )));
            }
            self.normalizer.validate(line.amount.currency(), line.exchange_rate)?;
        }
        Ok(())
    }

    fn stage_line(
        &self,
        entry_id: JournalEntryId,
        line: &LineDraft,
        account_id: AccountId,
    ) -> Result<JournalLine, LedgerError> {
        let base = self.normalizer.to_base(&line.amount, line.exchange_rate)?;
        let amount = line.amount.amount();
        let (debit_amount, credit_amount) = match line.side {
            PostingSide::Debit => (amount, Decimal::ZERO),
            PostingSide::Credit => (Decimal::ZERO, amount),
        };

        Ok(JournalLine {
            id: JournalLineId::new_v7(),
            entry_id,
            account_id,
            description: line.description.clone(),
            debit_amount,
            credit_amount,
            currency: line.amount.currency(),
            exchange_rate: line.exchange_rate.value(),
            base_amount: base,
        })
    }
}

impl std::fmt::Debug for JournalEntryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalEntryWriter")
            .field("base_currency", &self.normalizer.base())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountRef;
    use crate::currency::ExchangeRate;
    use crate::ports::mock::MockLedgerPort;
    use core_kernel::Money;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn tzs(amount: Decimal) -> Money {
        Money::new(amount, Currency::TZS)
    }

    fn setup(policy: UnresolvedAccountPolicy) -> (Arc<MockLedgerPort>, JournalEntryWriter) {
        let port = Arc::new(MockLedgerPort::with_standard_chart());
        let writer = JournalEntryWriter::new(port.clone(), Currency::TZS).with_policy(policy);
        (port, writer)
    }

    fn sale(amount: Decimal) -> EntryDraft {
        EntryDraft::new("Cash sale", ReferenceType::Invoice, Uuid::new_v4())
            .debit(AccountRef::code("1120"), tzs(amount), ExchangeRate::ONE)
            .credit(AccountRef::code("4110"), tzs(amount), ExchangeRate::ONE)
    }

    #[tokio::test]
    async fn test_write_posted_entry() {
        let (port, writer) = setup(UnresolvedAccountPolicy::Reject);
        let actor = UserId::new();

        let entry = writer.write(sale(dec!(5000)), true, actor).await.unwrap();

        assert_eq!(entry.entry_number, "JE-000001");
        assert_eq!(entry.status, EntryStatus::Posted);
        assert_eq!(entry.posted_by, Some(actor));
        assert!(entry.posted_at.is_some());
        assert_eq!(entry.created_by, actor);
        assert_eq!(entry.lines.len(), 2);
        assert!(entry.is_balanced());
        assert!(entry.lines.iter().all(|l| l.entry_id == entry.id));
        assert_eq!(port.get_entry(entry.id).await.unwrap(), Some(entry));
    }

    #[tokio::test]
    async fn test_write_draft_entry() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let entry = writer.write(sale(dec!(10)), false, UserId::new()).await.unwrap();

        assert_eq!(entry.status, EntryStatus::Draft);
        assert!(entry.posted_at.is_none());
        assert!(entry.posted_by.is_none());
    }

    #[tokio::test]
    async fn test_unresolved_account_rejects_whole_entry() {
        let (port, writer) = setup(UnresolvedAccountPolicy::Reject);
        port.remove_account("4110").await;

        let result = writer.write(sale(dec!(10)), true, UserId::new()).await;

        match result {
            Err(LedgerError::UnresolvedAccounts(accounts)) => {
                assert_eq!(accounts, vec!["code 4110"])
            }
            other => panic!("expected UnresolvedAccounts, got {:?}", other),
        }
        assert_eq!(port.entry_count().await, 0);
        // No entry number is consumed before validation passes
        assert_eq!(port.next_entry_number().await.unwrap(), "JE-000001");
    }

    #[tokio::test]
    async fn test_skip_line_policy_drops_unresolved_line() {
        let (port, writer) = setup(UnresolvedAccountPolicy::SkipLine);
        port.remove_account("4110").await;

        let entry = writer.write(sale(dec!(10)), true, UserId::new()).await.unwrap();

        assert_eq!(entry.lines.len(), 1);
        assert!(!entry.is_balanced());
    }

    #[tokio::test]
    async fn test_skip_line_policy_with_nothing_left() {
        let (_, writer) = setup(UnresolvedAccountPolicy::SkipLine);
        let draft = EntryDraft::new("Nowhere", ReferenceType::Adjustment, Uuid::new_v4())
            .debit(AccountRef::code("0001"), tzs(dec!(1)), ExchangeRate::ONE)
            .credit(AccountRef::code("0002"), tzs(dec!(1)), ExchangeRate::ONE);

        let result = writer.write(draft, true, UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::EmptyEntry)));
    }

    #[tokio::test]
    async fn test_unbalanced_draft_is_rejected() {
        let (port, writer) = setup(UnresolvedAccountPolicy::SkipLine);
        let draft = EntryDraft::new("Lopsided", ReferenceType::Adjustment, Uuid::new_v4())
            .debit(AccountRef::code("1120"), tzs(dec!(100)), ExchangeRate::ONE)
            .credit(AccountRef::code("4110"), tzs(dec!(90)), ExchangeRate::ONE);

        let result = writer.write(draft, true, UserId::new()).await;

        assert!(matches!(
            result,
            Err(LedgerError::UnbalancedEntry { debits, credits })
                if debits == dec!(100) && credits == dec!(90)
        ));
        assert_eq!(port.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_base_amount_keeps_sub_minor_unit_precision() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);

        let entry = writer.write(sale(dec!(10.125)), true, UserId::new()).await.unwrap();

        for line in &entry.lines {
            let raw = line.debit_amount + line.credit_amount;
            assert_eq!(line.base_amount, raw * line.exchange_rate);
            assert_eq!(line.base_amount, dec!(10.125));
        }
    }

    #[tokio::test]
    async fn test_split_foreign_lines_balance_without_rounding() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let rate = ExchangeRate::new(Currency::USD, dec!(2500)).unwrap();
        let usd = |amount| Money::new(amount, Currency::USD);
        let draft = EntryDraft::new("Split fee", ReferenceType::Adjustment, Uuid::new_v4())
            .debit(AccountRef::code("5100"), usd(dec!(0.005)), rate)
            .debit(AccountRef::code("5300"), usd(dec!(0.005)), rate)
            .credit(AccountRef::code("1110"), usd(dec!(0.01)), rate);

        let entry = writer.write(draft, true, UserId::new()).await.unwrap();

        assert!(entry.is_balanced());
        assert_eq!(entry.totals(), (dec!(25), dec!(25)));
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let result = writer.write(sale(Decimal::ZERO), true, UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[tokio::test]
    async fn test_empty_draft_is_rejected() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let draft = EntryDraft::new("Nothing", ReferenceType::Adjustment, Uuid::new_v4());
        let result = writer.write(draft, true, UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::EmptyEntry)));
    }

    #[tokio::test]
    async fn test_entry_number_failure_writes_nothing() {
        let (port, writer) = setup(UnresolvedAccountPolicy::Reject);
        port.fail_entry_numbers(true);

        let result = writer.write(sale(dec!(10)), true, UserId::new()).await;

        assert!(matches!(result, Err(LedgerError::EntryNumber(_))));
        assert!(result.unwrap_err().is_transient());
        assert_eq!(port.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_insert_failure_leaves_no_orphan_header() {
        let (port, writer) = setup(UnresolvedAccountPolicy::Reject);
        port.fail_inserts(true);

        let result = writer.write(sale(dec!(10)), true, UserId::new()).await;

        assert!(matches!(result, Err(LedgerError::Persistence(_))));
        assert_eq!(port.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_post_draft() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let poster = UserId::new();
        let draft = writer.write(sale(dec!(10)), false, UserId::new()).await.unwrap();

        let posted = writer.post_draft(draft.id, poster).await.unwrap();
        assert_eq!(posted.status, EntryStatus::Posted);
        assert_eq!(posted.posted_by, Some(poster));

        let again = writer.post_draft(draft.id, poster).await;
        assert!(matches!(
            again,
            Err(LedgerError::EntryAlreadyPosted(n)) if n == draft.entry_number
        ));
    }

    #[tokio::test]
    async fn test_post_missing_entry() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let result = writer.post_draft(JournalEntryId::new(), UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::EntryNotFound(_))));
    }

    #[tokio::test]
    async fn test_reverse_swaps_sides() {
        let (port, writer) = setup(UnresolvedAccountPolicy::Reject);
        let actor = UserId::new();
        let original = writer.write(sale(dec!(700)), true, actor).await.unwrap();

        let reversal = writer.reverse(original.id, "duplicate invoice", actor).await.unwrap();

        assert_eq!(reversal.reference_type, ReferenceType::Adjustment);
        assert_eq!(reversal.reference_id, *original.id.as_uuid());
        assert!(reversal.is_posted());
        assert!(reversal.is_balanced());
        for (orig, rev) in original.lines.iter().zip(&reversal.lines) {
            assert_eq!(orig.account_id, rev.account_id);
            assert_eq!(orig.debit_amount, rev.credit_amount);
            assert_eq!(orig.credit_amount, rev.debit_amount);
            assert_eq!(orig.base_amount, rev.base_amount);
        }
        assert_eq!(port.entry_count().await, 2);
    }

    #[tokio::test]
    async fn test_drafts_cannot_be_reversed() {
        let (_, writer) = setup(UnresolvedAccountPolicy::Reject);
        let draft = writer.write(sale(dec!(1)), false, UserId::new()).await.unwrap();
        let result = writer.reverse(draft.id, "oops", UserId::new()).await;
        assert!(matches!(result, Err(LedgerError::InvalidOperation(_))));
    }
}
