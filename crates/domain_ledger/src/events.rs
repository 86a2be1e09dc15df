//! Event-specific entry builders
//!
//! Each business event maps to exactly two symbolic lines:
//!
//! | Event | Debit | Credit |
//! |-------|-------|--------|
//! | [`InvoiceIssued`] | Accounts Receivable | Shipping Revenue |
//! | [`PaymentReceived`] | deposit account, else cash by currency | Accounts Receivable |
//! | [`ExpenseApproved`] | expense by category | Accounts Payable |
//! | [`ExpensePaid`] | expense by category | bank account |
//! | [`AgentInvoiceReceived`] | agent cost by region | Agent Payables |
//! | [`AgentPaymentMade`] | Agent Payables | source account, else cash by currency |
//! | [`AgentBilled`] | Accounts Receivable | Shipping Revenue |
//!
//! Builders never fail: unknown categories and regions fall back to the
//! catch-all accounts. Amounts in the base currency are always booked at a
//! rate of 1 regardless of the rate carried by the event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{
    AccountId, AgentBillingId, AgentInvoiceId, ExpenseId, InvoiceId, Money, PaymentId,
};

use crate::account::{
    agent_cost_account_code, cash_account_code, codes, expense_account_code, AccountRef,
};
use crate::currency::{CurrencyNormalizer, ExchangeRate};
use crate::draft::EntryDraft;
use crate::journal::ReferenceType;

/// Maps a business event to an unresolved journal entry
pub trait EntryBuilder {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft;
}

#[allow(clippy::too_many_arguments)]
fn two_line_entry(
    normalizer: &CurrencyNormalizer,
    description: String,
    reference_type: ReferenceType,
    reference_id: uuid::Uuid,
    date: NaiveDate,
    debit: AccountRef,
    credit: AccountRef,
    amount: Money,
    rate: ExchangeRate,
) -> EntryDraft {
    let rate = normalizer.rate_for(amount.currency(), rate);
    EntryDraft::new(description, reference_type, reference_id)
        .dated(date)
        .debit(debit, amount, rate)
        .credit(credit, amount, rate)
}

/// A customer invoice was issued
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceIssued {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    pub issued_on: NaiveDate,
}

impl EntryBuilder for InvoiceIssued {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Invoice {} issued", self.invoice_number),
            ReferenceType::Invoice,
            *self.invoice_id.as_uuid(),
            self.issued_on,
            AccountRef::code(codes::ACCOUNTS_RECEIVABLE),
            AccountRef::code(codes::SHIPPING_REVENUE),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// A customer paid (part of) an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceived {
    pub payment_id: PaymentId,
    pub invoice_number: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    /// Bank or cash account the money landed in, when the user picked one
    pub deposit_account: Option<AccountId>,
    pub received_on: NaiveDate,
}

impl EntryBuilder for PaymentReceived {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Payment received for invoice {}", self.invoice_number),
            ReferenceType::Payment,
            *self.payment_id.as_uuid(),
            self.received_on,
            AccountRef::id_or_code(self.deposit_account, cash_account_code(self.amount.currency())),
            AccountRef::code(codes::ACCOUNTS_RECEIVABLE),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// An operating expense was approved and is now owed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseApproved {
    pub expense_id: ExpenseId,
    pub expense_number: String,
    pub category: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    pub approved_on: NaiveDate,
}

impl EntryBuilder for ExpenseApproved {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Expense {} approved ({})", self.expense_number, self.category),
            ReferenceType::Expense,
            *self.expense_id.as_uuid(),
            self.approved_on,
            AccountRef::code(expense_account_code(&self.category)),
            AccountRef::code(codes::ACCOUNTS_PAYABLE),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// An expense was paid directly from a bank account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpensePaid {
    pub expense_id: ExpenseId,
    pub expense_number: String,
    pub category: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    pub bank_account: AccountId,
    pub paid_on: NaiveDate,
}

impl EntryBuilder for ExpensePaid {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Expense {} paid ({})", self.expense_number, self.category),
            ReferenceType::Expense,
            *self.expense_id.as_uuid(),
            self.paid_on,
            AccountRef::code(expense_account_code(&self.category)),
            AccountRef::id(self.bank_account),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// An overseas agent invoiced us for handling costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInvoiceReceived {
    pub agent_invoice_id: AgentInvoiceId,
    pub agent_name: String,
    pub invoice_number: String,
    pub region: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    pub received_on: NaiveDate,
}

impl EntryBuilder for AgentInvoiceReceived {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Agent invoice {} from {}", self.invoice_number, self.agent_name),
            ReferenceType::Expense,
            *self.agent_invoice_id.as_uuid(),
            self.received_on,
            AccountRef::code(agent_cost_account_code(&self.region)),
            AccountRef::code(codes::AGENT_PAYABLES),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// We settled an amount owed to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPaymentMade {
    pub payment_id: PaymentId,
    pub agent_name: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    pub source_account: Option<AccountId>,
    pub paid_on: NaiveDate,
}

impl EntryBuilder for AgentPaymentMade {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Payment to agent {}", self.agent_name),
            ReferenceType::Payment,
            *self.payment_id.as_uuid(),
            self.paid_on,
            AccountRef::code(codes::AGENT_PAYABLES),
            AccountRef::id_or_code(self.source_account, cash_account_code(self.amount.currency())),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// We billed an agent for services rendered on their behalf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentBilled {
    pub billing_id: AgentBillingId,
    pub agent_name: String,
    pub billing_number: String,
    pub amount: Money,
    pub exchange_rate: ExchangeRate,
    pub billed_on: NaiveDate,
}

impl EntryBuilder for AgentBilled {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        two_line_entry(
            normalizer,
            format!("Agent billing {} to {}", self.billing_number, self.agent_name),
            ReferenceType::Invoice,
            *self.billing_id.as_uuid(),
            self.billed_on,
            AccountRef::code(codes::ACCOUNTS_RECEIVABLE),
            AccountRef::code(codes::SHIPPING_REVENUE),
            self.amount,
            self.exchange_rate,
        )
    }
}

/// Any event the ledger knows how to post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    InvoiceIssued(InvoiceIssued),
    PaymentReceived(PaymentReceived),
    ExpenseApproved(ExpenseApproved),
    ExpensePaid(ExpensePaid),
    AgentInvoiceReceived(AgentInvoiceReceived),
    AgentPaymentMade(AgentPaymentMade),
    AgentBilled(AgentBilled),
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::InvoiceIssued(_) => "invoice_issued",
            LedgerEvent::PaymentReceived(_) => "payment_received",
            LedgerEvent::ExpenseApproved(_) => "expense_approved",
            LedgerEvent::ExpensePaid(_) => "expense_paid",
            LedgerEvent::AgentInvoiceReceived(_) => "agent_invoice_received",
            LedgerEvent::AgentPaymentMade(_) => "agent_payment_made",
            LedgerEvent::AgentBilled(_) => "agent_billed",
        }
    }
}

impl EntryBuilder for LedgerEvent {
    fn build(&self, normalizer: &CurrencyNormalizer) -> EntryDraft {
        match self {
            LedgerEvent::InvoiceIssued(e) => e.build(normalizer),
            LedgerEvent::PaymentReceived(e) => e.build(normalizer),
            LedgerEvent::ExpenseApproved(e) => e.build(normalizer),
            LedgerEvent::ExpensePaid(e) => e.build(normalizer),
            LedgerEvent::AgentInvoiceReceived(e) => e.build(normalizer),
            LedgerEvent::AgentPaymentMade(e) => e.build(normalizer),
            LedgerEvent::AgentBilled(e) => e.build(normalizer),
        }
    }
}

macro_rules! impl_from_event {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for LedgerEvent {
                fn from(event: $variant) -> Self {
                    LedgerEvent::$variant(event)
                }
            }
        )*
    };
}

impl_from_event!(
    InvoiceIssued,
    PaymentReceived,
    ExpenseApproved,
    ExpensePaid,
    AgentInvoiceReceived,
    AgentPaymentMade,
    AgentBilled
);
