//! Crossrate Common Types
//!
//! Shared value types for the crossrate conversion engine: currencies,
//! exact-decimal monetary amounts, exchange rates and time helpers.

pub mod currency;
pub mod error;
pub mod money;
pub mod rate;
pub mod time;

pub use currency::{registry, Currency};
pub use error::{MoneyError, MoneyResult};
pub use money::Money;
pub use rate::ExchangeRate;
pub use time::{hour_bucket, now, Timestamp};
