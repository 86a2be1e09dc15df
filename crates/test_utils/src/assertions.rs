//! Custom Test Assertions
//!
//! Assertion helpers for journal entries that print the offending lines
//! instead of a bare `false`.

use rust_decimal::Decimal;

use core_kernel::{AccountId, Currency, Money};
use domain_ledger::{EntryStatus, JournalEntry, JournalLine};

fn describe_lines(entry: &JournalEntry) -> String {
    entry
        .lines
        .iter()
        .map(|l| {
            format!(
                "  {} dr={} cr={} {} @{} base={}",
                l.account_id,
                l.debit_amount,
                l.credit_amount,
                l.currency,
                l.exchange_rate,
                l.base_amount
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Asserts that two Money values are equal within `tolerance`
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}",
        actual.amount(),
        expected.amount(),
        diff
    );
}

/// Asserts that base-currency debits equal base-currency credits
pub fn assert_entry_balanced(entry: &JournalEntry) {
    let (debits, credits) = entry.totals();
    assert_eq!(
        debits,
        credits,
        "Entry {} is unbalanced: debits={}, credits={}\n{}",
        entry.entry_number,
        debits,
        credits,
        describe_lines(entry)
    );
}

/// Asserts the entry's status and that the posting stamp matches it
pub fn assert_entry_status(entry: &JournalEntry, expected: EntryStatus) {
    assert_eq!(entry.status, expected, "Entry {} has the wrong status", entry.entry_number);
    match expected {
        EntryStatus::Posted => assert!(
            entry.posted_at.is_some() && entry.posted_by.is_some(),
            "Posted entry {} is missing its posting stamp",
            entry.entry_number
        ),
        EntryStatus::Draft => assert!(
            entry.posted_at.is_none() && entry.posted_by.is_none(),
            "Draft entry {} carries a posting stamp",
            entry.entry_number
        ),
    }
}

/// Returns the single line booked against `account_id`
///
/// # Panics
///
/// Panics unless exactly one line uses the account.
pub fn line_for_account(entry: &JournalEntry, account_id: AccountId) -> &JournalLine {
    let matches: Vec<&JournalLine> = entry
        .lines
        .iter()
        .filter(|l| l.account_id == account_id)
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "Expected one line for account {} in {}, found {}\n{}",
        account_id,
        entry.entry_number,
        matches.len(),
        describe_lines(entry)
    );
    matches[0]
}

/// Asserts a debit line's transaction amount, currency and base amount
pub fn assert_debit_line(
    line: &JournalLine,
    amount: Decimal,
    currency: Currency,
    base_amount: Decimal,
) {
    assert_eq!(line.debit_amount, amount, "debit amount");
    assert_eq!(line.credit_amount, Decimal::ZERO, "debit line has a credit amount");
    assert_eq!(line.currency, currency, "line currency");
    assert_eq!(line.base_amount, base_amount, "base amount");
}

/// Asserts a credit line's transaction amount, currency and base amount
pub fn assert_credit_line(
    line: &JournalLine,
    amount: Decimal,
    currency: Currency,
    base_amount: Decimal,
) {
    assert_eq!(line.credit_amount, amount, "credit amount");
    assert_eq!(line.debit_amount, Decimal::ZERO, "credit line has a debit amount");
    assert_eq!(line.currency, currency, "line currency");
    assert_eq!(line.base_amount, base_amount, "base amount");
}
