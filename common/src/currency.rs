//! Currency value type and the predefined currency registry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MoneyError, MoneyResult};

/// An ISO-4217-like currency: a three-letter code, a display name and an
/// optional symbol.
///
/// Equality and hashing cover the whole `(code, name, symbol)` tuple, so
/// two currencies with the same code but different names are distinct
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    code: String,
    name: String,
    symbol: Option<String>,
}

impl Currency {
    /// Create a new currency.
    ///
    /// The code must be exactly three ASCII letters and is uppercased on
    /// construction; the name must be non-empty.
    pub fn new(code: &str, name: &str, symbol: Option<&str>) -> MoneyResult<Self> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(MoneyError::InvalidArgument(format!(
                "currency code must be three letters, got {code:?}"
            )));
        }
        if name.is_empty() {
            return Err(MoneyError::InvalidArgument(
                "currency name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            code: code.to_ascii_uppercase(),
            name: name.to_string(),
            symbol: symbol.map(str::to_string),
        })
    }

    /// The uppercase three-letter code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The full display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The display symbol, if the currency has one.
    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            Some(symbol) => write!(f, "{} ({}) - {}", self.name, self.code, symbol),
            None => write!(f, "{} ({})", self.name, self.code),
        }
    }
}

/// Process-wide registry of predefined currencies.
///
/// Built once on first access and read-only afterwards; callers get
/// `&'static` singletons without going through validation.
pub mod registry {
    use super::Currency;
    use once_cell::sync::Lazy;

    static CURRENCIES: Lazy<Vec<Currency>> = Lazy::new(|| {
        // Fields are known-valid, so constants bypass `Currency::new`.
        let entry = |code: &str, name: &str, symbol: &str| Currency {
            code: code.to_string(),
            name: name.to_string(),
            symbol: Some(symbol.to_string()),
        };
        vec![
            entry("EUR", "Euro", "\u{20ac}"),
            entry("USD", "US Dollar", "$"),
            entry("GBP", "British Pound", "\u{a3}"),
            entry("JPY", "Japanese Yen", "\u{a5}"),
            entry("CHF", "Swiss Franc", "CHF"),
            entry("CAD", "Canadian Dollar", "C$"),
            entry("AUD", "Australian Dollar", "A$"),
        ]
    });

    /// All predefined currencies, in registry order.
    pub fn all() -> &'static [Currency] {
        &CURRENCIES
    }

    /// Look up a predefined currency by code (case-insensitive).
    pub fn lookup(code: &str) -> Option<&'static Currency> {
        CURRENCIES
            .iter()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }

    fn by_code(code: &str) -> &'static Currency {
        // Registry order is fixed; every accessor below names a seeded code.
        CURRENCIES
            .iter()
            .find(|c| c.code() == code)
            .unwrap_or(&CURRENCIES[0])
    }

    pub fn eur() -> &'static Currency {
        by_code("EUR")
    }

    pub fn usd() -> &'static Currency {
        by_code("USD")
    }

    pub fn gbp() -> &'static Currency {
        by_code("GBP")
    }

    pub fn jpy() -> &'static Currency {
        by_code("JPY")
    }

    pub fn chf() -> &'static Currency {
        by_code("CHF")
    }

    pub fn cad() -> &'static Currency {
        by_code("CAD")
    }

    pub fn aud() -> &'static Currency {
        by_code("AUD")
    }
}
