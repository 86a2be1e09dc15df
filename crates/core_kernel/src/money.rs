//! Money types with precise decimal arithmetic
//!
//! Amounts are carried as `rust_decimal::Decimal` together with an ISO 4217
//! currency. The ledger books in many currencies and normalizes every line to
//! a single base currency, so conversion is a first-class operation here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    TZS,
    USD,
    EUR,
    GBP,
    CNY,
    AED,
    KES,
    UGX,
    INR,
    JPY,
}

impl Currency {
    /// All supported currencies
    pub const ALL: [Currency; 10] = [
        Currency::TZS,
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::CNY,
        Currency::AED,
        Currency::KES,
        Currency::UGX,
        Currency::INR,
        Currency::JPY,
    ];

    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY | Currency::UGX => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::TZS => "TSh",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CNY => "¥",
            Currency::AED => "AED",
            Currency::KES => "KSh",
            Currency::UGX => "USh",
            Currency::INR => "₹",
            Currency::JPY => "JP¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::TZS => "TZS",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CNY => "CNY",
            Currency::AED => "AED",
            Currency::KES => "KES",
            Currency::UGX => "UGX",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Currency::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| MoneyError::UnknownCurrency(s.to_string()))
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Invalid conversion rate: {0}")]
    InvalidRate(Decimal),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally so that exchange rate
/// products do not lose precision before they are rounded for booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn abs(&self) -> Self {
        Self {
            amount: self.amount.abs(),
            currency: self.currency,
        }
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self.amount.checked_add(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(sum, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let diff = self.amount.checked_sub(other.amount).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(diff, self.currency))
    }

    /// Multiplies by a scalar, keeping the currency
    pub fn multiply(&self, factor: Decimal) -> Result<Self, MoneyError> {
        let product = self.amount.checked_mul(factor).ok_or(MoneyError::Overflow)?;
        Ok(Self::new(product, self.currency))
    }

    /// Converts into `target` using `rate` units of target per unit of self
    ///
    /// The result is rounded to the target currency's decimal places.
    pub fn convert(&self, rate: Decimal, target: Currency) -> Result<Money, MoneyError> {
        if rate <= Decimal::ZERO {
            return Err(MoneyError::InvalidRate(rate));
        }
        let converted = self.amount.checked_mul(rate).ok_or(MoneyError::Overflow)?;
        Ok(Money::new(converted, target).round_to_currency())
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}
