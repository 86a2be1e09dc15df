//! Trial balance
//!
//! Folds posted journal entries into one base-currency balance per account.
//! Each account's net balance lands in the debit or the credit column; when
//! every entry balances, so do the column totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::{AccountId, Currency, Money, MoneyError};

use crate::account::{Account, AccountType};
use crate::error::LedgerError;
use crate::journal::JournalEntry;

/// One account row of a trial balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    pub account_id: AccountId,
    /// Chart code, or the account id when the account is not in the chart
    pub code: String,
    pub name: String,
    pub account_type: Option<AccountType>,
    pub debit: Money,
    pub credit: Money,
}

/// Trial balance report in the base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalance {
    pub currency: Currency,
    /// Rows ordered by account code, zero balances omitted
    pub lines: Vec<TrialBalanceLine>,
    /// Number of posted entries folded in
    pub entry_count: usize,
    pub total_debits: Money,
    pub total_credits: Money,
    pub is_balanced: bool,
}

impl TrialBalance {
    /// Builds a trial balance from posted entries; drafts are ignored
    pub fn from_entries(
        accounts: &[Account],
        entries: &[JournalEntry],
        base: Currency,
    ) -> Result<Self, LedgerError> {
        let chart: HashMap<AccountId, &Account> = accounts.iter().map(|a| (a.id, a)).collect();

        let mut net: HashMap<AccountId, Decimal> = HashMap::new();
        let mut entry_count = 0;
        for entry in entries.iter().filter(|e| e.is_posted()) {
            entry_count += 1;
            for line in &entry.lines {
                let signed = if line.is_debit() { line.base_amount } else { -line.base_amount };
                let balance = net.entry(line.account_id).or_insert(Decimal::ZERO);
                *balance = balance.checked_add(signed).ok_or(MoneyError::Overflow)?;
            }
        }

        let mut rows: BTreeMap<String, TrialBalanceLine> = BTreeMap::new();
        let mut total_debits = Money::zero(base);
        let mut total_credits = Money::zero(base);

        for (account_id, balance) in net {
            if balance.is_zero() {
                continue;
            }
            let (debit, credit) = if balance > Decimal::ZERO {
                (Money::new(balance, base), Money::zero(base))
            } else {
                (Money::zero(base), Money::new(-balance, base))
            };
            total_debits = total_debits.checked_add(&debit)?;
            total_credits = total_credits.checked_add(&credit)?;

            let line = match chart.get(&account_id) {
                Some(account) => TrialBalanceLine {
                    account_id,
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type: Some(account.account_type),
                    debit,
                    credit,
                },
                None => TrialBalanceLine {
                    account_id,
                    code: account_id.to_string(),
                    name: "Unknown account".to_string(),
                    account_type: None,
                    debit,
                    credit,
                },
            };
            rows.insert(line.code.clone(), line);
        }

        Ok(Self {
            currency: base,
            lines: rows.into_values().collect(),
            entry_count,
            is_balanced: total_debits == total_credits,
            total_debits,
            total_credits,
        })
    }

    pub fn line_for(&self, code: &str) -> Option<&TrialBalanceLine> {
        self.lines.iter().find(|l| l.code == code)
    }
}
