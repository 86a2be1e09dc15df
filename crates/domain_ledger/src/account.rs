//! Chart of accounts
//!
//! The ledger does not own the chart of accounts; it addresses accounts either
//! by their stable code (e.g. `"1120"` for TZS cash) or directly by identifier
//! when the caller already knows which account to use (a bank account picked
//! by the user, for instance).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{AccountId, Currency};

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Category of account for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    Cash,
    Receivables,
    Payables,
    AgentPayables,
    ShippingRevenue,
    OperatingExpense,
    AgentCost,
    Other,
}

impl AccountCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::Cash => "cash",
            AccountCategory::Receivables => "receivables",
            AccountCategory::Payables => "payables",
            AccountCategory::AgentPayables => "agent_payables",
            AccountCategory::ShippingRevenue => "shipping_revenue",
            AccountCategory::OperatingExpense => "operating_expense",
            AccountCategory::AgentCost => "agent_cost",
            AccountCategory::Other => "other",
        }
    }
}

impl FromStr for AccountCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(AccountCategory::Cash),
            "receivables" => Ok(AccountCategory::Receivables),
            "payables" => Ok(AccountCategory::Payables),
            "agent_payables" => Ok(AccountCategory::AgentPayables),
            "shipping_revenue" => Ok(AccountCategory::ShippingRevenue),
            "operating_expense" => Ok(AccountCategory::OperatingExpense),
            "agent_cost" => Ok(AccountCategory::AgentCost),
            "other" => Ok(AccountCategory::Other),
            other => Err(format!("unknown account category: {}", other)),
        }
    }
}

/// An account in the chart of accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Account code (e.g., "1120")
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub category: Option<AccountCategory>,
    /// Parent account ID (for hierarchical charts)
    pub parent_id: Option<AccountId>,
    pub description: Option<String>,
    /// Inactive accounts are not offered for resolution
    pub is_active: bool,
}

impl Account {
    /// Creates a new active account
    pub fn new(
        id: AccountId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            account_type,
            category: None,
            parent_id: None,
            description: None,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: AccountCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_parent(mut self, parent_id: AccountId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Reference to a ledger account as supplied by an entry builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum AccountRef {
    /// Look the account up by its chart-of-accounts code
    ByCode(String),
    /// Use this account identifier as-is
    ById(AccountId),
}

impl AccountRef {
    pub fn code(code: impl Into<String>) -> Self {
        AccountRef::ByCode(code.into())
    }

    pub fn id(id: AccountId) -> Self {
        AccountRef::ById(id)
    }

    /// Uses `explicit` when present, otherwise the account with `fallback_code`
    pub fn id_or_code(explicit: Option<AccountId>, fallback_code: &str) -> Self {
        match explicit {
            Some(id) => AccountRef::ById(id),
            None => AccountRef::ByCode(fallback_code.to_string()),
        }
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountRef::ByCode(code) => write!(f, "code {}", code),
            AccountRef::ById(id) => write!(f, "{}", id),
        }
    }
}

/// Stable account codes used by the entry builders
pub mod codes {
    pub const CASH_USD: &str = "1110";
    pub const CASH_TZS: &str = "1120";
    pub const ACCOUNTS_RECEIVABLE: &str = "1210";

    pub const ACCOUNTS_PAYABLE: &str = "2110";
    pub const AGENT_PAYABLES: &str = "2120";

    pub const SHIPPING_REVENUE: &str = "4110";

    pub const FREIGHT_EXPENSE: &str = "5100";
    pub const WAREHOUSE_EXPENSE: &str = "5200";
    pub const CUSTOMS_EXPENSE: &str = "5300";
    pub const TRANSPORT_EXPENSE: &str = "5400";
    pub const RENT_EXPENSE: &str = "5500";
    pub const SALARIES_EXPENSE: &str = "5600";
    pub const UTILITIES_EXPENSE: &str = "5700";
    pub const OTHER_EXPENSE: &str = "5900";

    pub const AGENT_COST_CHINA: &str = "5810";
    pub const AGENT_COST_UAE: &str = "5820";
    pub const AGENT_COST_UK: &str = "5830";
    pub const AGENT_COST_USA: &str = "5840";
    pub const AGENT_COST_TURKEY: &str = "5850";
    pub const AGENT_COST_OTHER: &str = "5890";
}

fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Expense account code for an expense category name
///
/// Unknown categories book to "Other Expenses".
pub fn expense_account_code(category: &str) -> &'static str {
    match normalize_key(category).as_str() {
        "freight" | "shipping" | "air_freight" | "sea_freight" => codes::FREIGHT_EXPENSE,
        "warehouse" | "handling" | "storage" => codes::WAREHOUSE_EXPENSE,
        "customs" | "duty" | "duties" | "clearing" => codes::CUSTOMS_EXPENSE,
        "transport" | "delivery" | "fuel" => codes::TRANSPORT_EXPENSE,
        "rent" | "office" => codes::RENT_EXPENSE,
        "salaries" | "salary" | "wages" => codes::SALARIES_EXPENSE,
        "utilities" | "internet" | "communication" => codes::UTILITIES_EXPENSE,
        _ => codes::OTHER_EXPENSE,
    }
}

/// Agent cost account code for an agent's operating region
///
/// Unknown regions book to "Agent Cost - Other".
pub fn agent_cost_account_code(region: &str) -> &'static str {
    match normalize_key(region).as_str() {
        "china" | "cn" => codes::AGENT_COST_CHINA,
        "uae" | "dubai" => codes::AGENT_COST_UAE,
        "uk" | "united_kingdom" => codes::AGENT_COST_UK,
        "usa" | "us" | "united_states" => codes::AGENT_COST_USA,
        "turkey" | "tr" => codes::AGENT_COST_TURKEY,
        _ => codes::AGENT_COST_OTHER,
    }
}

/// Cash account code for receipts and payments in `currency`
pub fn cash_account_code(currency: Currency) -> &'static str {
    match currency {
        Currency::TZS => codes::CASH_TZS,
        _ => codes::CASH_USD,
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(AccountType::Asset),
            "liability" => Ok(AccountType::Liability),
            "equity" => Ok(AccountType::Equity),
            "revenue" => Ok(AccountType::Revenue),
            "expense" => Ok(AccountType::Expense),
            other => Err(format!("unknown account type: {}", other)),
        }
    }
}

/// Standard chart of accounts for a freight forwarder
pub struct FreightChartOfAccounts;

impl FreightChartOfAccounts {
    /// Creates the accounts every entry builder can book against
    pub fn standard_accounts() -> Vec<Account> {
        use AccountCategory as C;
        use AccountType as T;

        let chart: [(&str, &str, AccountType, AccountCategory); 20] = [
            (codes::CASH_USD, "Cash - USD", T::Asset, C::Cash),
            (codes::CASH_TZS, "Cash - TZS", T::Asset, C::Cash),
            (codes::ACCOUNTS_RECEIVABLE, "Accounts Receivable", T::Asset, C::Receivables),
            (codes::ACCOUNTS_PAYABLE, "Accounts Payable", T::Liability, C::Payables),
            (codes::AGENT_PAYABLES, "Agent Payables", T::Liability, C::AgentPayables),
            (codes::SHIPPING_REVENUE, "Shipping Revenue", T::Revenue, C::ShippingRevenue),
            (codes::FREIGHT_EXPENSE, "Freight Expense", T::Expense, C::OperatingExpense),
            (codes::WAREHOUSE_EXPENSE, "Warehouse & Handling", T::Expense, C::OperatingExpense),
            (codes::CUSTOMS_EXPENSE, "Customs & Duties", T::Expense, C::OperatingExpense),
            (
                codes::TRANSPORT_EXPENSE,
                "Local Transport & Delivery",
                T::Expense,
                C::OperatingExpense,
            ),
            (codes::RENT_EXPENSE, "Rent & Office", T::Expense, C::OperatingExpense),
            (codes::SALARIES_EXPENSE, "Salaries & Wages", T::Expense, C::OperatingExpense),
            (
                codes::UTILITIES_EXPENSE,
                "Utilities & Communication",
                T::Expense,
                C::OperatingExpense,
            ),
            (codes::OTHER_EXPENSE, "Other Expenses", T::Expense, C::Other),
            (codes::AGENT_COST_CHINA, "Agent Cost - China", T::Expense, C::AgentCost),
            (codes::AGENT_COST_UAE, "Agent Cost - UAE", T::Expense, C::AgentCost),
            (codes::AGENT_COST_UK, "Agent Cost - UK", T::Expense, C::AgentCost),
            (codes::AGENT_COST_USA, "Agent Cost - USA", T::Expense, C::AgentCost),
            (codes::AGENT_COST_TURKEY, "Agent Cost - Turkey", T::Expense, C::AgentCost),
            (codes::AGENT_COST_OTHER, "Agent Cost - Other", T::Expense, C::AgentCost),
        ];

        chart.into_iter()
            .map(|(code, name, account_type, category)| {
                Account::new(AccountId::new_v7(), code, name, account_type).with_category(category)
            })
            .collect()
    }
}
