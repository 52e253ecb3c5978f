//! Exchange rate records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::Currency;
use crate::error::{MoneyError, MoneyResult};
use crate::money::Money;
use crate::time::{now, Timestamp};

/// A quoted exchange rate between two currencies.
///
/// Rates are transient: they are recreated on every lookup from whichever
/// table or cache answered, and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Units of `to` per one unit of `from`.
    pub rate: Decimal,
    /// When the rate was quoted.
    pub timestamp: Timestamp,
}

impl ExchangeRate {
    /// Create a rate quoted now.
    pub fn new(from: Currency, to: Currency, rate: Decimal) -> Self {
        Self {
            from,
            to,
            rate,
            timestamp: now(),
        }
    }

    /// Create a rate with an explicit quote timestamp.
    pub fn at(from: Currency, to: Currency, rate: Decimal, timestamp: Timestamp) -> Self {
        Self {
            from,
            to,
            rate,
            timestamp,
        }
    }

    /// Apply the rate to an amount denominated in the source currency.
    ///
    /// The result is exact (no rounding); display rounding is the
    /// caller's concern.
    pub fn apply(&self, money: &Money) -> MoneyResult<Money> {
        if money.currency != self.from {
            return Err(MoneyError::mismatch(
                self.from.code(),
                money.currency.code(),
            ));
        }
        Ok(Money::new(money.amount * self.rate, self.to.clone()))
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \u{2192} {}: {}",
            self.from.code(),
            self.to.code(),
            self.rate
        )
    }
}
