//! Dynamic-mode converter backed by the provider chain.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crossrate_common::{now, registry, Currency, ExchangeRate, Money, Timestamp};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::backend::HttpTransport;
use crate::cache::CacheInfo;
use crate::error::{FxError, FxResult};
use crate::provider::{ProviderConfig, RateProviderChain};
use crate::table::PairKey;

/// A completed conversion, for callers that want more than the output
/// amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Unique conversion ID.
    pub id: Uuid,
    /// Input amount.
    pub input: Money,
    /// Output amount.
    pub output: Money,
    /// The rate that was applied.
    pub rate: ExchangeRate,
    /// When the conversion was executed.
    pub executed_at: Timestamp,
}

impl Conversion {
    fn new(input: Money, output: Money, rate: ExchangeRate) -> Self {
        Self {
            id: Uuid::now_v7(),
            input,
            output,
            rate,
            executed_at: now(),
        }
    }

    /// Output per unit of input.
    pub fn effective_rate(&self) -> Decimal {
        if self.input.amount.is_zero() {
            return Decimal::ZERO;
        }
        self.output.amount / self.input.amount
    }
}

/// Converter that resolves rates through the backend chain instead of a
/// static table.
///
/// Rates actually used for conversions are kept in a small map so
/// callers can inspect what was applied, mirroring the cache-info
/// surface of the chain itself.
pub struct EnhancedConverter {
    provider: RateProviderChain,
    recent: DashMap<PairKey, ExchangeRate>,
}

impl EnhancedConverter {
    /// Create a converter over the default provider chain.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_provider(RateProviderChain::new(transport))
    }

    /// Create a converter with a custom chain configuration.
    pub fn with_config(transport: Arc<dyn HttpTransport>, config: ProviderConfig) -> Self {
        Self::with_provider(RateProviderChain::with_config(transport, config))
    }

    /// Create a converter over an existing chain.
    pub fn with_provider(provider: RateProviderChain) -> Self {
        Self {
            provider,
            recent: DashMap::new(),
        }
    }

    /// Convert an amount to the target currency.
    ///
    /// Identity conversions return the input untouched without a rate
    /// lookup. Everything else resolves a single rate through the chain
    /// and fails with [`FxError::RateUnavailable`] when no backend,
    /// cache line or default-table entry knows the pair.
    pub async fn convert(&self, money: &Money, target: &Currency) -> FxResult<Money> {
        if money.currency == *target {
            return Ok(money.clone());
        }

        let rate = self.resolve_rate(&money.currency, target).await?;
        let output = rate.apply(money)?;
        self.recent.insert(PairKey::of(&money.currency, target), rate);
        Ok(output)
    }

    /// Convert with the cache cleared first, forcing a backend fetch.
    pub async fn convert_fresh(&self, money: &Money, target: &Currency) -> FxResult<Money> {
        self.provider.clear_cache();
        self.convert(money, target).await
    }

    /// Convert and return the full receipt.
    pub async fn convert_detailed(&self, money: &Money, target: &Currency) -> FxResult<Conversion> {
        let rate = if money.currency == *target {
            ExchangeRate::new(money.currency.clone(), target.clone(), Decimal::ONE)
        } else {
            self.resolve_rate(&money.currency, target).await?
        };

        let output = rate.apply(money)?;
        self.recent
            .insert(PairKey::of(&money.currency, target), rate.clone());

        let conversion = Conversion::new(money.clone(), output, rate);
        info!(
            conversion_id = %conversion.id,
            from = conversion.input.currency.code(),
            to = conversion.output.currency.code(),
            effective_rate = %conversion.effective_rate(),
            "conversion completed"
        );
        Ok(conversion)
    }

    /// The current rate between two currencies, stamped now.
    pub async fn current_rate(&self, from: &Currency, to: &Currency) -> Option<ExchangeRate> {
        let rate = self.provider.single_rate(from, to).await?;
        Some(ExchangeRate::new(from.clone(), to.clone(), rate))
    }

    /// All rates from a base currency, restricted to registry currencies
    /// and excluding the base itself.
    pub async fn all_rates_from(&self, base: &Currency) -> HashMap<Currency, ExchangeRate> {
        let rates = self.provider.exchange_rates(base).await;
        rates
            .into_iter()
            .filter(|(code, _)| code != base.code())
            .filter_map(|(code, rate)| {
                registry::lookup(&code).map(|target| {
                    (
                        target.clone(),
                        ExchangeRate::new(base.clone(), target.clone(), rate),
                    )
                })
            })
            .collect()
    }

    /// Registry currencies reachable through the chain, using EUR as the
    /// listing base.
    pub async fn available_currencies(&self) -> HashSet<Currency> {
        let eur = registry::eur();
        let rates = self.provider.exchange_rates(eur).await;

        let mut currencies = HashSet::from([eur.clone()]);
        for code in rates.keys() {
            if let Some(currency) = registry::lookup(code) {
                currencies.insert(currency.clone());
            }
        }
        currencies
    }

    /// The rate most recently applied to this pair, if any.
    pub fn last_rate(&self, from: &Currency, to: &Currency) -> Option<ExchangeRate> {
        self.recent.get(&PairKey::of(from, to)).map(|r| r.clone())
    }

    /// Snapshot of the chain's cache state.
    pub fn cache_info(&self) -> CacheInfo {
        self.provider.cache_info()
    }

    /// Drop cached rates and the applied-rate history.
    pub fn clear_cache(&self) {
        self.provider.clear_cache();
        self.recent.clear();
    }

    async fn resolve_rate(&self, from: &Currency, to: &Currency) -> FxResult<ExchangeRate> {
        let rate = self
            .provider
            .single_rate(from, to)
            .await
            .ok_or_else(|| FxError::unavailable(from.code(), to.code()))?;
        Ok(ExchangeRate::new(from.clone(), to.clone(), rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{success_body, SequenceTransport};
    use rust_decimal_macros::dec;

    fn converter_with(transport: Arc<SequenceTransport>) -> EnhancedConverter {
        EnhancedConverter::new(transport)
    }

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, registry::eur().clone())
    }

    #[tokio::test]
    async fn test_identity_conversion_skips_lookup() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport.clone());
        let m = eur(dec!(123.456789));

        let back = converter.convert(&m, registry::eur()).await.unwrap();

        assert_eq!(back, m);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_applies_fetched_rate() {
        let transport = Arc::new(SequenceTransport::new());
        transport.push_ok(success_body());
        let converter = converter_with(transport);

        let usd = converter
            .convert(&eur(dec!(1000)), registry::usd())
            .await
            .unwrap();

        assert_eq!(usd.currency, *registry::usd());
        assert_eq!(usd.amount, dec!(1090.0000));

        // The applied rate is recorded.
        let last = converter
            .last_rate(registry::eur(), registry::usd())
            .unwrap();
        assert_eq!(last.rate, dec!(1.0900));
    }

    #[tokio::test]
    async fn test_convert_falls_back_to_default_table() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport);

        let gbp = converter
            .convert(&Money::new(dec!(100), registry::usd().clone()), registry::gbp())
            .await
            .unwrap();

        assert_eq!(gbp.amount, dec!(100) * (dec!(0.8320) / dec!(1.0850)));
    }

    #[tokio::test]
    async fn test_unknown_pair_is_unavailable() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport);
        let sek = Currency::new("SEK", "Swedish Krona", None).unwrap();

        let err = converter
            .convert(&Money::new(dec!(10), sek), registry::usd())
            .await
            .unwrap_err();

        match err {
            FxError::RateUnavailable { from, to } => {
                assert_eq!(from, "SEK");
                assert_eq!(to, "USD");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_convert_detailed() {
        let transport = Arc::new(SequenceTransport::new());
        transport.push_ok(success_body());
        let converter = converter_with(transport);

        let receipt = converter
            .convert_detailed(&eur(dec!(1000)), registry::usd())
            .await
            .unwrap();

        assert_eq!(receipt.input.amount, dec!(1000));
        assert_eq!(receipt.output.amount, dec!(1090.0000));
        assert_eq!(receipt.effective_rate(), dec!(1.09));
        assert_eq!(receipt.rate.to.code(), "USD");
    }

    #[tokio::test]
    async fn test_convert_detailed_identity_uses_unit_rate() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport.clone());

        let receipt = converter
            .convert_detailed(&eur(dec!(42)), registry::eur())
            .await
            .unwrap();

        assert_eq!(receipt.rate.rate, Decimal::ONE);
        assert_eq!(receipt.output.amount, dec!(42));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_convert_fresh_refetches() {
        let transport = Arc::new(SequenceTransport::new());
        transport.push_ok(success_body());
        transport.push_ok(success_body());
        let converter = converter_with(transport.clone());

        converter
            .convert(&eur(dec!(1)), registry::usd())
            .await
            .unwrap();
        converter
            .convert_fresh(&eur(dec!(1)), registry::usd())
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_current_rate_is_stamped() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport);

        let before = now();
        let rate = converter
            .current_rate(registry::eur(), registry::usd())
            .await
            .unwrap();

        assert_eq!(rate.rate, dec!(1.0850));
        assert!(rate.timestamp >= before);
    }

    #[tokio::test]
    async fn test_all_rates_from_excludes_base() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport);

        let rates = converter.all_rates_from(registry::eur()).await;

        // Default table minus EUR itself.
        assert_eq!(rates.len(), 6);
        assert!(!rates.contains_key(registry::eur()));
        assert_eq!(rates[registry::usd()].rate, dec!(1.0850));
        assert_eq!(rates[registry::usd()].from, *registry::eur());
    }

    #[tokio::test]
    async fn test_available_currencies_covers_registry() {
        let transport = Arc::new(SequenceTransport::new());
        let converter = converter_with(transport);

        let currencies = converter.available_currencies().await;

        assert_eq!(currencies.len(), 7);
        assert!(currencies.contains(registry::eur()));
        assert!(currencies.contains(registry::aud()));
    }

    #[tokio::test]
    async fn test_clear_cache_drops_history() {
        let transport = Arc::new(SequenceTransport::new());
        transport.push_ok(success_body());
        let converter = converter_with(transport);

        converter
            .convert(&eur(dec!(1)), registry::usd())
            .await
            .unwrap();
        assert!(converter
            .last_rate(registry::eur(), registry::usd())
            .is_some());
        assert_eq!(converter.cache_info().entries, 1);

        converter.clear_cache();

        assert!(converter
            .last_rate(registry::eur(), registry::usd())
            .is_none());
        assert_eq!(converter.cache_info().entries, 0);
    }
}
