//! Exact-decimal monetary amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::currency::Currency;
use crate::error::{MoneyError, MoneyResult};

/// A monetary amount in a specific currency.
///
/// Amounts are arbitrary-precision decimals, never binary floats, so
/// chained conversions do not accumulate representation error. Every
/// operation returns a new value; nothing is mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount (high precision decimal).
    pub amount: Decimal,
    /// The currency the amount is denominated in.
    pub currency: Currency,
}

impl Money {
    /// Create a new monetary amount.
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parse an amount from a decimal literal.
    pub fn from_str(literal: &str, currency: Currency) -> MoneyResult<Self> {
        let amount = literal.parse().map_err(|_| {
            MoneyError::InvalidArgument(format!("invalid amount literal {literal:?}"))
        })?;
        Ok(Self { amount, currency })
    }

    /// A zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// Check if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Check if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Round to the given number of decimal places, half-up.
    pub fn round(&self, places: u32) -> Self {
        Self {
            amount: self
                .amount
                .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero),
            currency: self.currency.clone(),
        }
    }

    /// Add another amount of the same currency.
    pub fn checked_add(&self, other: &Money) -> MoneyResult<Money> {
        self.check_same_currency(other)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Subtract another amount of the same currency.
    pub fn checked_sub(&self, other: &Money) -> MoneyResult<Money> {
        self.check_same_currency(other)?;
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Multiply by a dimensionless scalar; the currency is unchanged.
    pub fn multiply(&self, factor: Decimal) -> Money {
        Money {
            amount: self.amount * factor,
            currency: self.currency.clone(),
        }
    }

    /// Divide by a dimensionless scalar; the currency is unchanged.
    pub fn divide(&self, divisor: Decimal) -> MoneyResult<Money> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Money {
            amount: self.amount / divisor,
            currency: self.currency.clone(),
        })
    }

    /// Compare against another amount of the same currency.
    pub fn try_cmp(&self, other: &Money) -> MoneyResult<Ordering> {
        self.check_same_currency(other)?;
        Ok(self.amount.cmp(&other.amount))
    }

    fn check_same_currency(&self, other: &Money) -> MoneyResult<()> {
        if self.currency != other.currency {
            return Err(MoneyError::mismatch(
                self.currency.code(),
                other.currency.code(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    /// Canonical display rule: two decimal places, half-up, then the
    /// currency symbol if present, else the code.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        match self.currency.symbol() {
            Some(symbol) => write!(f, "{rounded:.2} {symbol}"),
            None => write!(f, "{rounded:.2} {}", self.currency.code()),
        }
    }
}

impl Add for Money {
    type Output = MoneyResult<Money>;

    fn add(self, other: Money) -> Self::Output {
        self.checked_add(&other)
    }
}

impl Sub for Money {
    type Output = MoneyResult<Money>;

    fn sub(self, other: Money) -> Self::Output {
        self.checked_sub(&other)
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, factor: Decimal) -> Self::Output {
        self.multiply(factor)
    }
}

impl PartialOrd for Money {
    /// Ordering only exists within a single currency; mixed-currency
    /// comparisons yield `None`. Use [`Money::try_cmp`] for an error.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency != other.currency {
            return None;
        }
        Some(self.amount.cmp(&other.amount))
    }
}
