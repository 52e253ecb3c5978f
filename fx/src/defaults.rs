//! Built-in default rates used when every backend fails.

use crossrate_common::{registry, Currency};
use rust_decimal::Decimal;

use crate::cache::RateMap;

/// The default table, quoted per 1 EUR.
///
/// `Decimal::new(m, s)` encodes `m * 10^-s`, so USD is 1.0850 and so on.
pub fn eur_rates() -> Vec<(&'static Currency, Decimal)> {
    vec![
        (registry::usd(), Decimal::new(10850, 4)),
        (registry::gbp(), Decimal::new(8320, 4)),
        (registry::jpy(), Decimal::new(16350, 2)),
        (registry::chf(), Decimal::new(9280, 4)),
        (registry::cad(), Decimal::new(14780, 4)),
        (registry::aud(), Decimal::new(16420, 4)),
        (registry::eur(), Decimal::ONE),
    ]
}

/// Default rates for an arbitrary base currency.
///
/// For EUR this is the table itself. For any other base in the table,
/// cross rates are computed by dividing through the EUR leg:
/// `cross(code) = eur_rate[code] / eur_rate[base]`, with the base itself
/// omitted. A base outside the table yields an empty map.
pub fn fallback_rates(base_code: &str) -> RateMap {
    let table: RateMap = eur_rates()
        .into_iter()
        .map(|(currency, rate)| (currency.code().to_string(), rate))
        .collect();

    if base_code == "EUR" {
        return table;
    }

    let Some(base_rate) = table.get(base_code).copied() else {
        return RateMap::new();
    };

    table
        .into_iter()
        .filter(|(code, _)| code != base_code)
        .map(|(code, rate)| (code, rate / base_rate))
        .collect()
}
