//! Test Data Builders
//!
//! Builders for ledger events and accounts with sensible defaults, so tests
//! only spell out the fields they assert on. Party names are generated with
//! `fake` where the value does not matter.

use chrono::NaiveDate;
use fake::faker::company::en::CompanyName;
use fake::Fake;

use core_kernel::{
    AccountId, AgentInvoiceId, Currency, ExpenseId, InvoiceId, Money, PaymentId,
};
use domain_ledger::{
    Account, AccountCategory, AccountType, AgentInvoiceReceived, AgentPaymentMade, ExchangeRate,
    ExpenseApproved, ExpensePaid, InvoiceIssued, PaymentReceived,
};

use crate::fixtures::{DateFixtures, MoneyFixtures, RateFixtures};

fn sequence_number(prefix: &str) -> String {
    format!("{}-{:06}", prefix, (1..1_000_000u32).fake::<u32>())
}

/// Builder for customer invoice and payment events
pub struct InvoiceEventBuilder {
    invoice_id: InvoiceId,
    invoice_number: String,
    amount: Money,
    exchange_rate: ExchangeRate,
    date: NaiveDate,
    deposit_account: Option<AccountId>,
}

impl Default for InvoiceEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceEventBuilder {
    /// 100 USD at 2,500 with a random invoice number
    pub fn new() -> Self {
        Self {
            invoice_id: InvoiceId::new(),
            invoice_number: sequence_number("INV"),
            amount: MoneyFixtures::usd_100(),
            exchange_rate: RateFixtures::usd_tzs(),
            date: DateFixtures::issue_date(),
            deposit_account: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.invoice_number = number.into();
        self
    }

    pub fn with_amount(mut self, amount: Money, exchange_rate: ExchangeRate) -> Self {
        self.amount = amount;
        self.exchange_rate = exchange_rate;
        self
    }

    /// Amount in the base currency, rate 1
    pub fn in_tzs(mut self, amount: rust_decimal::Decimal) -> Self {
        self.amount = Money::new(amount, Currency::TZS);
        self.exchange_rate = ExchangeRate::ONE;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn deposited_to(mut self, account: AccountId) -> Self {
        self.deposit_account = Some(account);
        self
    }

    pub fn issued(&self) -> InvoiceIssued {
        InvoiceIssued {
            invoice_id: self.invoice_id,
            invoice_number: self.invoice_number.clone(),
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            issued_on: self.date,
        }
    }

    /// Full payment of the invoice
    pub fn paid(&self) -> PaymentReceived {
        PaymentReceived {
            payment_id: PaymentId::new(),
            invoice_number: self.invoice_number.clone(),
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            deposit_account: self.deposit_account,
            received_on: self.date,
        }
    }
}

/// Builder for expense approval and payment events
pub struct ExpenseEventBuilder {
    expense_id: ExpenseId,
    expense_number: String,
    category: String,
    amount: Money,
    exchange_rate: ExchangeRate,
    date: NaiveDate,
}

impl Default for ExpenseEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseEventBuilder {
    /// 50 USD customs expense at 2,500
    pub fn new() -> Self {
        Self {
            expense_id: ExpenseId::new(),
            expense_number: sequence_number("EXP"),
            category: "customs".to_string(),
            amount: MoneyFixtures::usd_50(),
            exchange_rate: RateFixtures::usd_tzs(),
            date: DateFixtures::issue_date(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_amount(mut self, amount: Money, exchange_rate: ExchangeRate) -> Self {
        self.amount = amount;
        self.exchange_rate = exchange_rate;
        self
    }

    pub fn approved(&self) -> ExpenseApproved {
        ExpenseApproved {
            expense_id: self.expense_id,
            expense_number: self.expense_number.clone(),
            category: self.category.clone(),
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            approved_on: self.date,
        }
    }

    pub fn paid_from(&self, bank_account: AccountId) -> ExpensePaid {
        ExpensePaid {
            expense_id: self.expense_id,
            expense_number: self.expense_number.clone(),
            category: self.category.clone(),
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            bank_account,
            paid_on: self.date,
        }
    }
}

/// Builder for overseas agent invoices and the payments settling them
pub struct AgentEventBuilder {
    agent_name: String,
    region: String,
    amount: Money,
    exchange_rate: ExchangeRate,
    date: NaiveDate,
}

impl Default for AgentEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentEventBuilder {
    /// A China agent invoicing 100 USD
    pub fn new() -> Self {
        Self {
            agent_name: CompanyName().fake(),
            region: "China".to_string(),
            amount: MoneyFixtures::usd_100(),
            exchange_rate: RateFixtures::usd_tzs(),
            date: DateFixtures::issue_date(),
        }
    }

    pub fn in_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_amount(mut self, amount: Money, exchange_rate: ExchangeRate) -> Self {
        self.amount = amount;
        self.exchange_rate = exchange_rate;
        self
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn invoice(&self) -> AgentInvoiceReceived {
        AgentInvoiceReceived {
            agent_invoice_id: AgentInvoiceId::new(),
            agent_name: self.agent_name.clone(),
            invoice_number: sequence_number("AGI"),
            region: self.region.clone(),
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            received_on: self.date,
        }
    }

    pub fn payment(&self, source_account: Option<AccountId>) -> AgentPaymentMade {
        AgentPaymentMade {
            payment_id: PaymentId::new(),
            agent_name: self.agent_name.clone(),
            amount: self.amount,
            exchange_rate: self.exchange_rate,
            source_account,
            paid_on: self.date,
        }
    }
}

/// Builder for chart-of-accounts rows outside the standard chart
pub struct AccountBuilder {
    id: AccountId,
    code: String,
    name: String,
    account_type: AccountType,
    category: Option<AccountCategory>,
    active: bool,
}

impl AccountBuilder {
    /// An active bank (asset) account
    pub fn bank(code: impl Into<String>) -> Self {
        Self {
            id: AccountId::new(),
            code: code.into(),
            name: format!("{} Bank", CompanyName().fake::<String>()),
            account_type: AccountType::Asset,
            category: Some(AccountCategory::Cash),
            active: true,
        }
    }

    pub fn with_id(mut self, id: AccountId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> Account {
        let mut account = Account::new(self.id, self.code, self.name, self.account_type);
        if let Some(category) = self.category {
            account = account.with_category(category);
        }
        if !self.active {
            account = account.deactivated();
        }
        account
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_and_payment_share_number() {
        let builder = InvoiceEventBuilder::new().with_number("INV-2024-077");
        assert_eq!(builder.issued().invoice_number, "INV-2024-077");
        assert_eq!(builder.paid().invoice_number, "INV-2024-077");
    }

    #[test]
    fn test_tzs_amount_uses_rate_one() {
        let event = InvoiceEventBuilder::new()
            .in_tzs(rust_decimal_macros::dec!(75000))
            .issued();
        assert_eq!(event.amount.currency(), Currency::TZS);
        assert!(event.exchange_rate.is_one());
    }

    #[test]
    fn test_generated_numbers_have_prefix() {
        let expense = ExpenseEventBuilder::new().approved();
        assert!(expense.expense_number.starts_with("EXP-"));
        assert_eq!(expense.expense_number.len(), "EXP-".len() + 6);
    }

    #[test]
    fn test_agent_name_is_generated() {
        let builder = AgentEventBuilder::new();
        assert!(!builder.agent_name().is_empty());
        assert_eq!(builder.invoice().agent_name, builder.payment(None).agent_name);
    }

    #[test]
    fn test_inactive_bank_account() {
        let account = AccountBuilder::bank("1130").inactive().build();
        assert_eq!(account.code, "1130");
        assert!(!account.is_active);
        assert_eq!(account.category, Some(AccountCategory::Cash));
    }
}
