//! Property-Based Test Generators
//!
//! proptest strategies producing valid ledger inputs: supported currencies,
//! positive amounts, positive rates and complete business events.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{
    AgentBillingId, AgentInvoiceId, Currency, ExpenseId, InvoiceId, Money, PaymentId,
};
use domain_ledger::{
    AgentBilled, AgentInvoiceReceived, AgentPaymentMade, ExchangeRate, ExpenseApproved,
    InvoiceIssued, LedgerEvent, PaymentReceived,
};

/// Any supported currency, base currency included
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    proptest::sample::select(Currency::ALL.to_vec())
}

/// Positive amounts up to ten million major units, in the currency's minor unit
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (currency_strategy(), 1i64..1_000_000_000i64)
        .prop_map(|(currency, minor)| Money::from_minor(minor, currency))
}

/// Rates between 0.0001 and 10,000 with up to four decimals
pub fn exchange_rate_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// An amount with a matching rate into TZS
pub fn amount_and_rate_strategy() -> impl Strategy<Value = (Money, ExchangeRate)> {
    (positive_money_strategy(), exchange_rate_decimal_strategy()).prop_map(|(amount, rate)| {
        let rate = if amount.currency() == Currency::TZS {
            ExchangeRate::ONE
        } else {
            ExchangeRate::new(amount.currency(), rate).unwrap_or(ExchangeRate::ONE)
        };
        (amount, rate)
    })
}

/// Dates within 2024
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1u32..=366).prop_map(|ordinal| {
        NaiveDate::from_yo_opt(2024, ordinal).unwrap_or_default()
    })
}

/// Expense categories, including ones with no dedicated account
pub fn expense_category_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("freight".to_string()),
        Just("customs".to_string()),
        Just("warehouse".to_string()),
        Just("transport".to_string()),
        Just("rent".to_string()),
        "[a-z]{3,12}",
    ]
}

/// Agent regions, including unmapped ones
pub fn region_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("China".to_string()),
        Just("UAE".to_string()),
        Just("UK".to_string()),
        Just("USA".to_string()),
        Just("Turkey".to_string()),
        "[A-Z][a-z]{3,10}",
    ]
}

fn document_number(prefix: &'static str) -> impl Strategy<Value = String> {
    (1u32..1_000_000).prop_map(move |n| format!("{}-{:06}", prefix, n))
}

/// Events whose builders need no caller-supplied account
///
/// `ExpensePaid` is excluded since it always names a bank account.
pub fn ledger_event_strategy() -> impl Strategy<Value = LedgerEvent> {
    let common = || (amount_and_rate_strategy(), date_strategy());
    prop_oneof![
        (common(), document_number("INV")).prop_map(|(((amount, rate), date), number)| {
            LedgerEvent::from(InvoiceIssued {
                invoice_id: InvoiceId::new(),
                invoice_number: number,
                amount,
                exchange_rate: rate,
                issued_on: date,
            })
        }),
        (common(), document_number("INV")).prop_map(|(((amount, rate), date), number)| {
            LedgerEvent::from(PaymentReceived {
                payment_id: PaymentId::new(),
                invoice_number: number,
                amount,
                exchange_rate: rate,
                deposit_account: None,
                received_on: date,
            })
        }),
        (common(), document_number("EXP"), expense_category_strategy()).prop_map(
            |(((amount, rate), date), number, category)| {
                LedgerEvent::from(ExpenseApproved {
                    expense_id: ExpenseId::new(),
                    expense_number: number,
                    category,
                    amount,
                    exchange_rate: rate,
                    approved_on: date,
                })
            }
        ),
        (common(), document_number("AGI"), region_strategy()).prop_map(
            |(((amount, rate), date), number, region)| {
                LedgerEvent::from(AgentInvoiceReceived {
                    agent_invoice_id: AgentInvoiceId::new(),
                    agent_name: "Overseas Agent".to_string(),
                    invoice_number: number,
                    region,
                    amount,
                    exchange_rate: rate,
                    received_on: date,
                })
            }
        ),
        common().prop_map(|((amount, rate), date)| {
            LedgerEvent::from(AgentPaymentMade {
                payment_id: PaymentId::new(),
                agent_name: "Overseas Agent".to_string(),
                amount,
                exchange_rate: rate,
                source_account: None,
                paid_on: date,
            })
        }),
        (common(), document_number("AB")).prop_map(|(((amount, rate), date), number)| {
            LedgerEvent::from(AgentBilled {
                billing_id: AgentBillingId::new(),
                agent_name: "Overseas Agent".to_string(),
                billing_number: number,
                amount,
                exchange_rate: rate,
                billed_on: date,
            })
        }),
    ]
}
