//! Persisted journal entries and lines

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{AccountId, Currency, JournalEntryId, JournalLineId, Money, UserId};

use crate::draft::PostingSide;

/// Kind of record a journal entry originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Invoice,
    Payment,
    Expense,
    Adjustment,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Invoice => "invoice",
            ReferenceType::Payment => "payment",
            ReferenceType::Expense => "expense",
            ReferenceType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(ReferenceType::Invoice),
            "payment" => Ok(ReferenceType::Payment),
            "expense" => Ok(ReferenceType::Expense),
            "adjustment" => Ok(ReferenceType::Adjustment),
            other => Err(format!("unknown reference type: {}", other)),
        }
    }
}

/// Lifecycle state of a journal entry
///
/// The only transition is `Draft -> Posted`. Posted entries are never updated
/// or deleted; corrections go through a reversing entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Posted,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Posted => "posted",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(EntryStatus::Draft),
            "posted" => Ok(EntryStatus::Posted),
            other => Err(format!("unknown entry status: {}", other)),
        }
    }
}

/// A debit or credit against one resolved account
///
/// Exactly one of `debit_amount` / `credit_amount` is non-zero.
/// `base_amount` is that amount multiplied by `exchange_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub id: JournalLineId,
    pub entry_id: JournalEntryId,
    pub account_id: AccountId,
    pub description: Option<String>,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub currency: Currency,
    pub exchange_rate: Decimal,
    pub base_amount: Decimal,
}

impl JournalLine {
    pub fn side(&self) -> PostingSide {
        if self.debit_amount.is_zero() {
            PostingSide::Credit
        } else {
            PostingSide::Debit
        }
    }

    /// The line amount in its transaction currency
    pub fn amount(&self) -> Money {
        let raw = if self.debit_amount.is_zero() {
            self.credit_amount
        } else {
            self.debit_amount
        };
        Money::new(raw, self.currency)
    }

    pub fn is_debit(&self) -> bool {
        self.side() == PostingSide::Debit
    }
}

/// A journal entry header together with its lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    /// Sequential number handed out by the persistence layer (e.g. `JE-000042`)
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub description: String,
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
    pub status: EntryStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub posted_by: Option<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn is_posted(&self) -> bool {
        self.status == EntryStatus::Posted
    }

    /// Base-currency (debits, credits)
    pub fn totals(&self) -> (Decimal, Decimal) {
        base_totals(&self.lines)
    }

    pub fn is_balanced(&self) -> bool {
        let (debits, credits) = self.totals();
        debits == credits
    }
}

/// Sums base-currency debits and credits over `lines`
pub fn base_totals(lines: &[JournalLine]) -> (Decimal, Decimal) {
    lines.iter().fold((Decimal::ZERO, Decimal::ZERO), |(dr, cr), line| {
        if line.is_debit() {
            (dr + line.base_amount, cr)
        } else {
            (dr, cr + line.base_amount)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal, base: Decimal) -> JournalLine {
        JournalLine {
            id: JournalLineId::new(),
            entry_id: JournalEntryId::new(),
            account_id: AccountId::new(),
            description: None,
            debit_amount: debit,
            credit_amount: credit,
            currency: Currency::USD,
            exchange_rate: dec!(2500),
            base_amount: base,
        }
    }

    #[test]
    fn test_line_side_and_amount() {
        let dr = line(dec!(100), Decimal::ZERO, dec!(250000));
        assert_eq!(dr.side(), PostingSide::Debit);
        assert_eq!(dr.amount(), Money::new(dec!(100), Currency::USD));

        let cr = line(Decimal::ZERO, dec!(40), dec!(100000));
        assert_eq!(cr.side(), PostingSide::Credit);
        assert_eq!(cr.amount().amount(), dec!(40));
    }

    #[test]
    fn test_base_totals() {
        let lines = vec![
            line(dec!(100), Decimal::ZERO, dec!(250000)),
            line(Decimal::ZERO, dec!(60), dec!(150000)),
            line(Decimal::ZERO, dec!(40), dec!(100000)),
        ];
        assert_eq!(base_totals(&lines), (dec!(250000), dec!(250000)));
    }

    #[test]
    fn test_string_forms_round_trip() {
        let all = [
            ReferenceType::Invoice,
            ReferenceType::Payment,
            ReferenceType::Expense,
            ReferenceType::Adjustment,
        ];
        for rt in all {
            assert_eq!(rt.as_str().parse::<ReferenceType>().unwrap(), rt);
        }
        assert_eq!("posted".parse::<EntryStatus>().unwrap(), EntryStatus::Posted);
        assert!("void".parse::<EntryStatus>().is_err());
    }
}
