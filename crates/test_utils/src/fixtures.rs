//! Pre-built Test Fixtures
//!
//! Deterministic amounts, rates, dates and identifiers used across the
//! ledger test suites. The values mirror the worked examples the accounting
//! team uses: a 100 USD invoice at 2,500 TZS/USD, a 50 USD customs expense.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use core_kernel::{
    AccountId, AgentBillingId, AgentInvoiceId, Currency, ExpenseId, InvoiceId, Money, PaymentId,
    UserId,
};
use domain_ledger::{
    AgentBilled, AgentInvoiceReceived, AgentPaymentMade, ExchangeRate, ExpenseApproved, ExpensePaid,
    InvoiceIssued, PaymentReceived,
};

/// Money amounts
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    pub fn usd_50() -> Money {
        Money::new(dec!(50.00), Currency::USD)
    }

    /// 250,000 TZS, the base equivalent of [`usd_100`](Self::usd_100) at 2,500
    pub fn tzs_250k() -> Money {
        Money::new(dec!(250000), Currency::TZS)
    }

    pub fn tzs_10k() -> Money {
        Money::new(dec!(10000), Currency::TZS)
    }

    /// JPY has no minor unit
    pub fn jpy_10000() -> Money {
        Money::new(dec!(10000), Currency::JPY)
    }
}

/// Exchange rates into TZS
pub struct RateFixtures;

impl RateFixtures {
    pub fn usd_tzs_value() -> Decimal {
        dec!(2500)
    }

    pub fn usd_tzs() -> ExchangeRate {
        ExchangeRate::new(Currency::USD, Self::usd_tzs_value()).expect("fixture rate is positive")
    }

    pub fn eur_tzs() -> ExchangeRate {
        ExchangeRate::new(Currency::EUR, dec!(2750.50)).expect("fixture rate is positive")
    }

    pub fn jpy_tzs() -> ExchangeRate {
        ExchangeRate::new(Currency::JPY, dec!(17.25)).expect("fixture rate is positive")
    }
}

/// Calendar dates
pub struct DateFixtures;

impl DateFixtures {
    pub fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date")
    }

    pub fn payment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 28).expect("valid date")
    }
}

/// Deterministic identifiers
pub struct IdFixtures;

impl IdFixtures {
    /// The user recorded as creator/poster in tests
    pub fn actor() -> UserId {
        UserId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440001))
    }

    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440002))
    }

    pub fn expense_id() -> ExpenseId {
        ExpenseId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440003))
    }

    /// Not part of the standard chart; tests add it as a bank account
    pub fn bank_account_id() -> AccountId {
        AccountId::from_uuid(Uuid::from_u128(0x550e8400_e29b_41d4_a716_446655440004))
    }
}

/// One ready event of each kind
pub struct EventFixtures;

impl EventFixtures {
    /// INV-2024-001 for 100 USD at 2,500
    pub fn invoice_issued() -> InvoiceIssued {
        InvoiceIssued {
            invoice_id: IdFixtures::invoice_id(),
            invoice_number: "INV-2024-001".to_string(),
            amount: MoneyFixtures::usd_100(),
            exchange_rate: RateFixtures::usd_tzs(),
            issued_on: DateFixtures::issue_date(),
        }
    }

    pub fn payment_received() -> PaymentReceived {
        PaymentReceived {
            payment_id: PaymentId::new(),
            invoice_number: "INV-2024-001".to_string(),
            amount: MoneyFixtures::usd_100(),
            exchange_rate: RateFixtures::usd_tzs(),
            deposit_account: None,
            received_on: DateFixtures::payment_date(),
        }
    }

    /// EXP-2024-001, 50 USD of customs duty
    pub fn expense_approved() -> ExpenseApproved {
        ExpenseApproved {
            expense_id: IdFixtures::expense_id(),
            expense_number: "EXP-2024-001".to_string(),
            category: "customs".to_string(),
            amount: MoneyFixtures::usd_50(),
            exchange_rate: RateFixtures::usd_tzs(),
            approved_on: DateFixtures::issue_date(),
        }
    }

    pub fn expense_paid() -> ExpensePaid {
        ExpensePaid {
            expense_id: IdFixtures::expense_id(),
            expense_number: "EXP-2024-001".to_string(),
            category: "customs".to_string(),
            amount: MoneyFixtures::usd_50(),
            exchange_rate: RateFixtures::usd_tzs(),
            bank_account: IdFixtures::bank_account_id(),
            paid_on: DateFixtures::payment_date(),
        }
    }

    pub fn agent_invoice_received() -> AgentInvoiceReceived {
        AgentInvoiceReceived {
            agent_invoice_id: AgentInvoiceId::new(),
            agent_name: "Guangzhou Cargo Partners".to_string(),
            invoice_number: "GZ-7781".to_string(),
            region: "China".to_string(),
            amount: MoneyFixtures::usd_100(),
            exchange_rate: RateFixtures::usd_tzs(),
            received_on: DateFixtures::issue_date(),
        }
    }

    pub fn agent_payment_made() -> AgentPaymentMade {
        AgentPaymentMade {
            payment_id: PaymentId::new(),
            agent_name: "Guangzhou Cargo Partners".to_string(),
            amount: MoneyFixtures::usd_100(),
            exchange_rate: RateFixtures::usd_tzs(),
            source_account: None,
            paid_on: DateFixtures::payment_date(),
        }
    }

    pub fn agent_billed() -> AgentBilled {
        AgentBilled {
            billing_id: AgentBillingId::new(),
            agent_name: "Dubai Freight Hub".to_string(),
            billing_number: "AB-2024-014".to_string(),
            amount: MoneyFixtures::tzs_10k(),
            exchange_rate: ExchangeRate::ONE,
            billed_on: DateFixtures::issue_date(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_equivalent_matches_rate() {
        let converted = MoneyFixtures::usd_100()
            .convert(RateFixtures::usd_tzs_value(), Currency::TZS)
            .unwrap();
        assert_eq!(converted, MoneyFixtures::tzs_250k());
    }

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::actor(), IdFixtures::actor());
        assert_eq!(IdFixtures::invoice_id(), IdFixtures::invoice_id());
        assert_ne!(IdFixtures::invoice_id().as_uuid(), IdFixtures::expense_id().as_uuid());
    }

    #[test]
    fn test_dates_are_ordered() {
        assert!(DateFixtures::issue_date() < DateFixtures::payment_date());
    }
}
