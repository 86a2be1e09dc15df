//! Symbolic journal entries
//!
//! An [`EntryDraft`] is what an entry builder produces: a description, the
//! originating record and a list of lines that still refer to accounts
//! symbolically. The writer resolves and persists it.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::Money;

use crate::account::AccountRef;
use crate::currency::ExchangeRate;
use crate::journal::ReferenceType;

/// Side of a journal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingSide {
    Debit,
    Credit,
}

impl PostingSide {
    pub fn opposite(self) -> Self {
        match self {
            PostingSide::Debit => PostingSide::Credit,
            PostingSide::Credit => PostingSide::Debit,
        }
    }
}

/// A single line before account resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDraft {
    pub account: AccountRef,
    pub description: Option<String>,
    pub side: PostingSide,
    /// Amount in the transaction currency (always positive)
    pub amount: Money,
    /// Multiplier into the base currency
    pub exchange_rate: ExchangeRate,
}

impl LineDraft {
    pub fn debit(account: AccountRef, amount: Money, exchange_rate: ExchangeRate) -> Self {
        Self {
            account,
            description: None,
            side: PostingSide::Debit,
            amount,
            exchange_rate,
        }
    }

    pub fn credit(account: AccountRef, amount: Money, exchange_rate: ExchangeRate) -> Self {
        Self {
            account,
            description: None,
            side: PostingSide::Credit,
            amount,
            exchange_rate,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A journal entry before account resolution and numbering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub description: String,
    pub entry_date: NaiveDate,
    pub reference_type: ReferenceType,
    /// Identifier of the originating invoice, payment, expense or entry
    pub reference_id: Uuid,
    pub lines: Vec<LineDraft>,
}

impl EntryDraft {
    /// Creates an empty draft dated today (UTC)
    pub fn new(
        description: impl Into<String>,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Self {
        Self {
            description: description.into(),
            entry_date: Utc::now().date_naive(),
            reference_type,
            reference_id,
            lines: Vec::new(),
        }
    }

    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.entry_date = date;
        self
    }

    pub fn debit(
        mut self,
        account: AccountRef,
        amount: Money,
        exchange_rate: ExchangeRate,
    ) -> Self {
        self.lines.push(LineDraft::debit(account, amount, exchange_rate));
        self
    }

    pub fn credit(
        mut self,
        account: AccountRef,
        amount: Money,
        exchange_rate: ExchangeRate,
    ) -> Self {
        self.lines.push(LineDraft::credit(account, amount, exchange_rate));
        self
    }

    pub fn line(mut self, line: LineDraft) -> Self {
        self.lines.push(line);
        self
    }

    /// Account references in line order
    pub fn account_refs(&self) -> Vec<AccountRef> {
        self.lines.iter().map(|l| l.account.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_draft_builder_keeps_line_order() {
        let amount = Money::new(dec!(10), Currency::TZS);
        let draft = EntryDraft::new("Test", ReferenceType::Adjustment, Uuid::new_v4())
            .debit(AccountRef::code("1120"), amount, ExchangeRate::ONE)
            .credit(AccountRef::code("4110"), amount, ExchangeRate::ONE);

        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].side, PostingSide::Debit);
        assert_eq!(draft.lines[1].side, PostingSide::Credit);
        assert_eq!(
            draft.account_refs(),
            vec![AccountRef::code("1120"), AccountRef::code("4110")]
        );
    }

    #[test]
    fn test_opposite_side() {
        assert_eq!(PostingSide::Debit.opposite(), PostingSide::Credit);
        assert_eq!(PostingSide::Credit.opposite(), PostingSide::Debit);
    }
}
