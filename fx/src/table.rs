//! Static rate table and pivot conversion.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crossrate_common::{registry, Currency, ExchangeRate, Money, Timestamp};
use rust_decimal::Decimal;
use tracing::debug;

use crate::defaults;
use crate::error::{FxError, FxResult};

/// Composite key for a stored rate: ordered `(from, to)` currency codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    from: String,
    to: String,
}

impl PairKey {
    /// Build the key for a directed currency pair.
    pub fn of(from: &Currency, to: &Currency) -> Self {
        Self {
            from: from.code().to_string(),
            to: to.code().to_string(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// A store of exchange rates with single-hop pivot conversion.
///
/// Direct and inverse rates are independent entries: adding `EUR -> SEK`
/// says nothing about `SEK -> EUR`. Only [`RateTable::with_default_rates`]
/// stores inverses, computed once as `1/rate` at load time; user-added
/// rates never auto-derive them.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<PairKey, ExchangeRate>,
    pivot: Currency,
}

impl RateTable {
    /// An empty table with EUR as the pivot currency.
    pub fn new() -> Self {
        Self::with_pivot(registry::eur().clone())
    }

    /// An empty table with a custom pivot currency.
    pub fn with_pivot(pivot: Currency) -> Self {
        Self {
            rates: HashMap::new(),
            pivot,
        }
    }

    /// A table seeded with the built-in EUR rates and their inverses.
    pub fn with_default_rates() -> Self {
        let mut table = Self::new();
        let eur = registry::eur();
        for (currency, rate) in defaults::eur_rates() {
            if currency == eur {
                continue;
            }
            table.add_rate(eur, currency, rate);
            table.add_rate(currency, eur, Decimal::ONE / rate);
        }
        table
    }

    /// The designated pivot currency.
    pub fn pivot(&self) -> &Currency {
        &self.pivot
    }

    /// Upsert the direct rate `from -> to`, quoted now.
    ///
    /// The inverse entry is untouched.
    pub fn add_rate(&mut self, from: &Currency, to: &Currency, rate: Decimal) {
        let entry = ExchangeRate::new(from.clone(), to.clone(), rate);
        self.rates.insert(PairKey::of(from, to), entry);
    }

    /// Upsert the direct rate with an explicit quote timestamp.
    pub fn add_rate_at(
        &mut self,
        from: &Currency,
        to: &Currency,
        rate: Decimal,
        timestamp: Timestamp,
    ) {
        let entry = ExchangeRate::at(from.clone(), to.clone(), rate, timestamp);
        self.rates.insert(PairKey::of(from, to), entry);
    }

    /// The stored direct rate, if any.
    pub fn rate(&self, from: &Currency, to: &Currency) -> Option<&ExchangeRate> {
        self.rates.get(&PairKey::of(from, to))
    }

    /// Convert an amount to the target currency.
    ///
    /// Resolution order: identity, direct rate, then a single hop
    /// through the pivot when the pivot differs from both endpoints and
    /// both legs have direct rates. No general path search is attempted,
    /// so every currency is expected to carry at least one rate to or
    /// from the pivot.
    pub fn convert(&self, money: &Money, target: &Currency) -> FxResult<Money> {
        if money.currency == *target {
            return Ok(money.clone());
        }

        if let Some(direct) = self.rate(&money.currency, target) {
            return Ok(direct.apply(money)?);
        }

        if self.pivot != money.currency && self.pivot != *target {
            if let (Some(leg_in), Some(leg_out)) = (
                self.rate(&money.currency, &self.pivot),
                self.rate(&self.pivot, target),
            ) {
                debug!(
                    from = money.currency.code(),
                    to = target.code(),
                    pivot = self.pivot.code(),
                    "converting through pivot"
                );
                let through = leg_in.apply(money)?;
                return Ok(leg_out.apply(&through)?);
            }
        }

        Err(FxError::unavailable(money.currency.code(), target.code()))
    }

    /// Every currency appearing as an endpoint of a stored rate.
    pub fn available_currencies(&self) -> HashSet<Currency> {
        let mut currencies = HashSet::new();
        for rate in self.rates.values() {
            currencies.insert(rate.from.clone());
            currencies.insert(rate.to.clone());
        }
        currencies
    }

    /// All stored rates whose source is the given currency.
    pub fn rates_from(&self, currency: &Currency) -> HashMap<Currency, ExchangeRate> {
        self.rates
            .values()
            .filter(|rate| rate.from == *currency)
            .map(|rate| (rate.to.clone(), rate.clone()))
            .collect()
    }

    /// Number of stored rate entries.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Check if the table has no rates.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sek() -> Currency {
        Currency::new("SEK", "Swedish Krona", Some("kr")).unwrap()
    }

    fn money(amount: Decimal, currency: &Currency) -> Money {
        Money::new(amount, currency.clone())
    }

    #[test]
    fn test_identity_conversion_is_exact() {
        let table = RateTable::new();
        let m = money(dec!(123.456789), registry::eur());

        // No rates loaded at all, identity still succeeds and is exact.
        let back = table.convert(&m, registry::eur()).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_direct_conversion() {
        let table = RateTable::with_default_rates();
        let eur = money(dec!(1000), registry::eur());

        let usd = table.convert(&eur, registry::usd()).unwrap();
        assert_eq!(usd.currency, *registry::usd());
        assert_eq!(usd.amount, dec!(1085.0000));
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let table = RateTable::with_default_rates();
        let original = money(dec!(1000), registry::eur());

        let usd = table.convert(&original, registry::usd()).unwrap();
        let back = table.convert(&usd, registry::eur()).unwrap();

        // Forward and inverse entries are independent, so the round trip
        // is close but not exact.
        let drift = (back.amount - original.amount).abs();
        assert!(drift < dec!(0.01), "drift was {drift}");
    }

    #[test]
    fn test_missing_rate() {
        let table = RateTable::new();
        let m = money(dec!(5), registry::eur());

        let err = table.convert(&m, registry::usd()).unwrap_err();
        match err {
            FxError::RateUnavailable { from, to } => {
                assert_eq!(from, "EUR");
                assert_eq!(to, "USD");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pivot_conversion() {
        let sek = sek();
        let mut table = RateTable::new();
        // Only SEK<->EUR and EUR->USD; no direct SEK->USD.
        table.add_rate(&sek, registry::eur(), dec!(0.0880));
        table.add_rate(registry::eur(), &sek, dec!(11.36));
        table.add_rate(registry::eur(), registry::usd(), dec!(1.0850));

        let usd = table.convert(&money(dec!(100), &sek), registry::usd()).unwrap();
        assert_eq!(usd.currency, *registry::usd());
        assert_eq!(usd.amount, dec!(100) * dec!(0.0880) * dec!(1.0850));
    }

    #[test]
    fn test_pivot_fails_when_outbound_leg_missing() {
        let sek = sek();
        let mut table = RateTable::new();
        table.add_rate(&sek, registry::eur(), dec!(0.0880));
        table.add_rate(registry::eur(), &sek, dec!(11.36));

        // Pivot has no rate to USD, so the conversion fails.
        assert!(matches!(
            table.convert(&money(dec!(100), &sek), registry::usd()),
            Err(FxError::RateUnavailable { .. })
        ));
    }

    #[test]
    fn test_pivot_is_single_hop_only() {
        let sek = sek();
        let nok = Currency::new("NOK", "Norwegian Krone", Some("kr")).unwrap();
        let mut table = RateTable::new();
        // SEK -> NOK -> EUR -> USD exists as a chain, but NOK is not the
        // pivot, so no path is found.
        table.add_rate(&sek, &nok, dec!(1.02));
        table.add_rate(&nok, registry::eur(), dec!(0.0860));
        table.add_rate(registry::eur(), registry::usd(), dec!(1.0850));

        assert!(matches!(
            table.convert(&money(dec!(100), &sek), registry::usd()),
            Err(FxError::RateUnavailable { .. })
        ));
    }

    #[test]
    fn test_add_rate_does_not_create_inverse() {
        let sek = sek();
        let mut table = RateTable::new();
        table.add_rate(registry::eur(), &sek, dec!(11.36));

        assert!(table.rate(registry::eur(), &sek).is_some());
        assert!(table.rate(&sek, registry::eur()).is_none());
    }

    #[test]
    fn test_add_rate_upserts() {
        let mut table = RateTable::new();
        table.add_rate(registry::eur(), registry::usd(), dec!(1.08));
        table.add_rate(registry::eur(), registry::usd(), dec!(1.09));

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rate(registry::eur(), registry::usd()).unwrap().rate,
            dec!(1.09)
        );
    }

    #[test]
    fn test_default_rates_store_inverses() {
        let table = RateTable::with_default_rates();
        // 6 currencies paired with EUR, both directions.
        assert_eq!(table.len(), 12);

        let inverse = table.rate(registry::usd(), registry::eur()).unwrap();
        assert_eq!(inverse.rate, Decimal::ONE / dec!(1.0850));
    }

    #[test]
    fn test_available_currencies() {
        let table = RateTable::with_default_rates();
        let currencies = table.available_currencies();
        assert_eq!(currencies.len(), 7);
        assert!(currencies.contains(registry::jpy()));
    }

    #[test]
    fn test_rates_from() {
        let table = RateTable::with_default_rates();
        let from_eur = table.rates_from(registry::eur());
        assert_eq!(from_eur.len(), 6);
        assert_eq!(from_eur[registry::usd()].rate, dec!(1.0850));
    }

    #[test]
    fn test_custom_pivot() {
        let sek = sek();
        let mut table = RateTable::with_pivot(registry::usd().clone());
        table.add_rate(&sek, registry::usd(), dec!(0.0955));
        table.add_rate(registry::usd(), registry::gbp(), dec!(0.7668));

        let gbp = table.convert(&money(dec!(100), &sek), registry::gbp()).unwrap();
        assert_eq!(gbp.amount, dec!(100) * dec!(0.0955) * dec!(0.7668));
    }
}
