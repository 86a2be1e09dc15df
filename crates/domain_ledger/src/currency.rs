//! Currency normalization
//!
//! Every journal line keeps the amount in the currency it was transacted in,
//! plus the rate used to express it in the ledger's base currency. The rate is
//! always supplied by the caller; nothing here looks rates up.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, Money, MoneyError};

use crate::error::LedgerError;

/// Multiplier from a transaction currency to the base currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRate(Decimal);

impl ExchangeRate {
    /// Rate used whenever the transaction currency is the base currency
    pub const ONE: ExchangeRate = ExchangeRate(Decimal::ONE);

    /// Creates a rate, rejecting zero and negative values
    pub fn new(currency: Currency, rate: Decimal) -> Result<Self, LedgerError> {
        if rate <= Decimal::ZERO {
            return Err(LedgerError::InvalidExchangeRate { currency, rate });
        }
        Ok(Self(rate))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_one(&self) -> bool {
        self.0 == Decimal::ONE
    }
}

impl Default for ExchangeRate {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Converts line amounts into the base currency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyNormalizer {
    base: Currency,
}

impl CurrencyNormalizer {
    pub fn new(base: Currency) -> Self {
        Self { base }
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    /// The rate to book for `currency`: 1 for the base currency, otherwise `supplied`
    pub fn rate_for(&self, currency: Currency, supplied: ExchangeRate) -> ExchangeRate {
        if currency == self.base {
            ExchangeRate::ONE
        } else {
            supplied
        }
    }

    /// Checks that `rate` may be booked against `currency`
    ///
    /// Base-currency amounts must carry a rate of exactly 1.
    pub fn validate(&self, currency: Currency, rate: ExchangeRate) -> Result<(), LedgerError> {
        if rate.value() <= Decimal::ZERO || (currency == self.base && !rate.is_one()) {
            return Err(LedgerError::InvalidExchangeRate {
                currency,
                rate: rate.value(),
            });
        }
        Ok(())
    }

    /// Returns `amount * rate` in the base currency
    ///
    /// The product is exact; a base-currency amount comes back unchanged even
    /// below the currency's minor unit.
    pub fn to_base(&self, amount: &Money, rate: ExchangeRate) -> Result<Decimal, LedgerError> {
        self.validate(amount.currency(), rate)?;
        let base = amount
            .amount()
            .checked_mul(rate.value())
            .ok_or(MoneyError::Overflow)?;
        Ok(base)
    }
}
