//! Integration Tests for the ledger service
//!
//! Business workflows driven through `LedgerService` against the in-memory
//! ledger store: invoice to cash, expense to payment, agent settlement, drafts,
//! configuration of the unresolved-account policy, and failure atomicity.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money};
use domain_ledger::ports::mock::MockLedgerPort;
use domain_ledger::{
    EntryStatus, JournalEntry, LedgerError, LedgerEvent, ReferenceType, UnresolvedAccountPolicy,
};
use ledger_service::{LedgerConfig, LedgerService, ServiceError};
use test_utils::{
    assert_credit_line, assert_debit_line, assert_entry_balanced, assert_entry_status,
    assert_money_approx_eq, line_for_account, AccountBuilder, AgentEventBuilder, EventFixtures,
    ExpenseEventBuilder, IdFixtures, InvoiceEventBuilder, MoneyFixtures, RateFixtures,
};

fn setup() -> (Arc<MockLedgerPort>, LedgerService) {
    setup_with(LedgerConfig::default())
}

fn setup_with(config: LedgerConfig) -> (Arc<MockLedgerPort>, LedgerService) {
    let port = Arc::new(MockLedgerPort::with_standard_chart());
    let service = LedgerService::new(port.clone(), &config);
    (port, service)
}

async fn account_id(port: &MockLedgerPort, code: &str) -> core_kernel::AccountId {
    port.account_by_code(code).await.expect("account in standard chart").id
}

mod customer_cycle {
    use super::*;

    #[tokio::test]
    async fn test_invoice_then_payment_clears_receivable() {
        let (port, ledger) = setup();
        let invoice = InvoiceEventBuilder::new().with_number("INV-2024-001");

        let issued = ledger.invoice_issued(invoice.issued(), IdFixtures::actor()).await.unwrap();
        let paid = ledger.payment_received(invoice.paid(), IdFixtures::actor()).await.unwrap();

        assert_eq!(issued.description, "Invoice INV-2024-001 issued");
        assert_eq!(paid.description, "Payment received for invoice INV-2024-001");
        assert_entry_balanced(&issued);
        assert_entry_balanced(&paid);

        let cash_usd = account_id(&port, "1110").await;
        assert_debit_line(
            line_for_account(&paid, cash_usd),
            dec!(100),
            Currency::USD,
            dec!(250000),
        );

        let tb = ledger.trial_balance().await.unwrap();
        assert!(tb.is_balanced);
        assert_eq!(tb.entry_count, 2);
        assert!(tb.line_for("1210").is_none(), "receivable should net to zero");
        assert_eq!(tb.line_for("1110").unwrap().debit, Money::new(dec!(250000), Currency::TZS));
        assert_eq!(tb.line_for("4110").unwrap().credit, Money::new(dec!(250000), Currency::TZS));
    }

    #[tokio::test]
    async fn test_payment_into_chosen_bank_account() {
        let (port, ledger) = setup();
        let bank = AccountBuilder::bank("1130").with_id(IdFixtures::bank_account_id()).build();
        port.add_account(bank).await;

        let payment = InvoiceEventBuilder::new()
            .in_tzs(dec!(80000))
            .deposited_to(IdFixtures::bank_account_id())
            .paid();
        let entry = ledger.record(payment, IdFixtures::actor()).await.unwrap();

        let line = line_for_account(&entry, IdFixtures::bank_account_id());
        assert_debit_line(line, dec!(80000), Currency::TZS, dec!(80000));
        assert_eq!(line.exchange_rate, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_duplicate_events_are_both_booked() {
        let (_port, ledger) = setup();
        let event = EventFixtures::invoice_issued();

        ledger.record(event.clone(), IdFixtures::actor()).await.unwrap();
        ledger.record(event.clone(), IdFixtures::actor()).await.unwrap();

        let entries = ledger
            .entries_for_reference(ReferenceType::Invoice, *event.invoice_id.as_uuid())
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_ne!(entries[0].entry_number, entries[1].entry_number);
    }
}

mod expense_cycle {
    use super::*;

    #[tokio::test]
    async fn test_customs_expense_approved_then_paid() {
        let (port, ledger) = setup();
        let bank = AccountBuilder::bank("1130").with_id(IdFixtures::bank_account_id()).build();
        port.add_account(bank).await;
        let expense = ExpenseEventBuilder::new();

        let approved = ledger
            .expense_approved(expense.approved(), IdFixtures::actor())
            .await
            .unwrap();
        let paid = ledger
            .expense_paid(expense.paid_from(IdFixtures::bank_account_id()), IdFixtures::actor())
            .await
            .unwrap();

        let customs = account_id(&port, "5300").await;
        let payables = account_id(&port, "2110").await;
        assert_debit_line(
            line_for_account(&approved, customs),
            dec!(50),
            Currency::USD,
            dec!(125000),
        );
        assert_credit_line(
            line_for_account(&approved, payables),
            dec!(50),
            Currency::USD,
            dec!(125000),
        );
        assert_credit_line(
            line_for_account(&paid, IdFixtures::bank_account_id()),
            dec!(50),
            Currency::USD,
            dec!(125000),
        );

        let tb = ledger.trial_balance().await.unwrap();
        assert_eq!(tb.line_for("5300").unwrap().debit.amount(), dec!(250000));
    }

    #[tokio::test]
    async fn test_unknown_category_books_to_other_expenses() {
        let (port, ledger) = setup();
        let event = ExpenseEventBuilder::new().with_category("fumigation").approved();

        let entry = ledger.record(event, IdFixtures::actor()).await.unwrap();

        let other = account_id(&port, "5900").await;
        assert!(line_for_account(&entry, other).is_debit());
    }
}

mod agent_cycle {
    use super::*;

    #[tokio::test]
    async fn test_agent_invoice_then_payment_clears_payables() {
        let (port, ledger) = setup();
        let agent = AgentEventBuilder::new().in_region("UAE");

        let invoice = ledger
            .agent_invoice_received(agent.invoice(), IdFixtures::actor())
            .await
            .unwrap();
        let payment = ledger
            .agent_payment_made(agent.payment(None), IdFixtures::actor())
            .await
            .unwrap();

        assert_eq!(invoice.reference_type, ReferenceType::Expense);
        assert_eq!(payment.reference_type, ReferenceType::Payment);
        assert!(invoice.description.contains(agent.agent_name()));

        let uae_cost = account_id(&port, "5820").await;
        assert!(line_for_account(&invoice, uae_cost).is_debit());

        let tb = ledger.trial_balance().await.unwrap();
        assert!(tb.line_for("2120").is_none(), "agent payables should net to zero");
        assert_eq!(tb.line_for("1110").unwrap().credit.amount(), dec!(250000));
    }

    #[tokio::test]
    async fn test_agent_billing_is_receivable() {
        let (port, ledger) = setup();
        let entry = ledger
            .agent_billed(EventFixtures::agent_billed(), IdFixtures::actor())
            .await
            .unwrap();

        assert_eq!(entry.reference_type, ReferenceType::Invoice);
        let receivable = account_id(&port, "1210").await;
        assert_debit_line(
            line_for_account(&entry, receivable),
            dec!(10000),
            Currency::TZS,
            dec!(10000),
        );
    }
}

mod drafts_and_reversals {
    use super::*;

    #[tokio::test]
    async fn test_drafts_stay_out_of_trial_balance_until_posted() {
        let config = LedgerConfig {
            auto_post: false,
            ..LedgerConfig::default()
        };
        let (_port, ledger) = setup_with(config);

        let draft = ledger
            .record(EventFixtures::invoice_issued(), IdFixtures::actor())
            .await
            .unwrap();
        assert_entry_status(&draft, EntryStatus::Draft);
        assert_eq!(ledger.trial_balance().await.unwrap().entry_count, 0);

        let posted = ledger.post_draft(draft.id, IdFixtures::actor()).await.unwrap();
        assert_entry_status(&posted, EntryStatus::Posted);
        assert_eq!(ledger.trial_balance().await.unwrap().entry_count, 1);
    }

    #[tokio::test]
    async fn test_record_with_overrides_default() {
        let (_port, ledger) = setup();
        assert!(ledger.auto_post());

        let event = LedgerEvent::from(EventFixtures::expense_approved());
        let entry = ledger.record_with(event, false, IdFixtures::actor()).await.unwrap();
        assert_entry_status(&entry, EntryStatus::Draft);
    }

    #[tokio::test]
    async fn test_reversal_nets_out_original() {
        let (_port, ledger) = setup();
        let original = ledger
            .record(EventFixtures::invoice_issued(), IdFixtures::actor())
            .await
            .unwrap();

        let reversal = ledger
            .reverse(original.id, "issued to the wrong customer", IdFixtures::actor())
            .await
            .unwrap();

        assert_eq!(reversal.reference_type, ReferenceType::Adjustment);
        assert_eq!(reversal.reference_id, *original.id.as_uuid());
        assert_entry_balanced(&reversal);

        let tb = ledger.trial_balance().await.unwrap();
        assert_eq!(tb.entry_count, 2);
        assert!(tb.lines.is_empty());
    }

    #[tokio::test]
    async fn test_posting_twice_is_rejected() {
        let (_port, ledger) = setup();
        let entry = ledger
            .record(EventFixtures::invoice_issued(), IdFixtures::actor())
            .await
            .unwrap();

        let err = ledger.post_draft(entry.id, IdFixtures::actor()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Ledger(LedgerError::EntryAlreadyPosted(_))));
    }
}

mod policy_and_failures {
    use super::*;

    #[tokio::test]
    async fn test_missing_account_rejected_by_default() {
        let (port, ledger) = setup();
        assert!(port.remove_account("4110").await);

        let err = ledger
            .record(EventFixtures::invoice_issued(), IdFixtures::actor())
            .await
            .unwrap_err();

        match err {
            ServiceError::Ledger(LedgerError::UnresolvedAccounts(accounts)) => {
                assert_eq!(accounts, vec!["code 4110".to_string()]);
            }
            other => panic!("Expected UnresolvedAccounts, got {other:?}"),
        }
        assert_eq!(port.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_skip_line_policy_keeps_one_line() {
        let config = LedgerConfig {
            unresolved_account_policy: UnresolvedAccountPolicy::SkipLine,
            ..LedgerConfig::default()
        };
        let (port, ledger) = setup_with(config);
        port.remove_account("4110").await;

        let entry = ledger
            .record(EventFixtures::invoice_issued(), IdFixtures::actor())
            .await
            .unwrap();

        assert_eq!(entry.lines.len(), 1);
        assert!(entry.lines[0].is_debit());
    }

    #[tokio::test]
    async fn test_number_failure_writes_nothing() {
        let (port, ledger) = setup();
        port.fail_entry_numbers(true);

        let err = ledger
            .record(EventFixtures::invoice_issued(), IdFixtures::actor())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Ledger(LedgerError::EntryNumber(_))));
        assert!(err.is_transient());
        assert_eq!(port.entry_count().await, 0);
    }

    #[tokio::test]
    async fn test_insert_failure_writes_nothing() {
        let (port, ledger) = setup();
        port.fail_inserts(true);

        let result = ledger.record(EventFixtures::expense_approved(), IdFixtures::actor()).await;

        assert!(result.is_err());
        assert_eq!(port.entry_count().await, 0);
    }
}

mod rates_and_payloads {
    use super::*;

    #[tokio::test]
    async fn test_current_rate_feeds_event() {
        let (port, ledger) = setup();
        port.set_exchange_rate(Currency::USD, Currency::TZS, RateFixtures::usd_tzs_value()).await;

        let rate = ledger.current_rate(Currency::USD).await.unwrap();
        let event = InvoiceEventBuilder::new()
            .with_amount(Money::new(dec!(40), Currency::USD), rate)
            .issued();
        let entry: JournalEntry = ledger.record(event, IdFixtures::actor()).await.unwrap();

        assert!(entry.lines.iter().all(|l| l.base_amount == dec!(100000)));
    }

    #[tokio::test]
    async fn test_other_currencies_convert_at_their_own_rates() {
        let (_port, ledger) = setup();
        let euros = Money::new(dec!(120.40), Currency::EUR);
        let expense = ExpenseEventBuilder::new()
            .with_amount(euros, RateFixtures::eur_tzs())
            .approved();
        let invoice = InvoiceEventBuilder::new()
            .with_amount(MoneyFixtures::jpy_10000(), RateFixtures::jpy_tzs())
            .issued();

        let expense_entry = ledger.record(expense, IdFixtures::actor()).await.unwrap();
        let invoice_entry = ledger.record(invoice, IdFixtures::actor()).await.unwrap();

        let expected_eur = euros.convert(RateFixtures::eur_tzs().value(), Currency::TZS).unwrap();
        let expected_jpy = MoneyFixtures::jpy_10000()
            .convert(RateFixtures::jpy_tzs().value(), Currency::TZS)
            .unwrap();
        for line in &expense_entry.lines {
            let base = Money::new(line.base_amount, Currency::TZS);
            assert_money_approx_eq(&base, &expected_eur, dec!(0.01));
        }
        for line in &invoice_entry.lines {
            let base = Money::new(line.base_amount, Currency::TZS);
            assert_money_approx_eq(&base, &expected_jpy, Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn test_base_currency_fractions_are_booked_as_given() {
        let (_port, ledger) = setup();
        let event = InvoiceEventBuilder::new().in_tzs(dec!(10.125)).issued();

        let entry = ledger.record(event, IdFixtures::actor()).await.unwrap();

        assert_entry_balanced(&entry);
        for line in &entry.lines {
            assert_eq!(line.exchange_rate, Decimal::ONE);
            assert_eq!(line.base_amount, dec!(10.125));
        }
    }

    #[tokio::test]
    async fn test_json_payload_is_recorded() {
        let (_port, ledger) = setup();
        let event = LedgerEvent::from(EventFixtures::agent_invoice_received());
        let payload = serde_json::to_string(&event).unwrap();
        assert!(payload.contains(r#""event":"agent_invoice_received""#));

        let entry = ledger.record_json(&payload, IdFixtures::actor()).await.unwrap();

        assert_eq!(entry.lines.len(), 2);
        assert_entry_balanced(&entry);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;
    use test_utils::ledger_event_strategy;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_every_recorded_event_balances(event in ledger_event_strategy()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let entry = runtime
                .block_on(async {
                    let (_port, ledger) = setup();
                    ledger.record(event, IdFixtures::actor()).await
                })
                .unwrap();

            prop_assert!(entry.is_balanced());
            prop_assert_eq!(entry.lines.len(), 2);
            prop_assert!(entry.lines.iter().all(|l| l.base_amount >= Decimal::ZERO));
        }
    }
}
