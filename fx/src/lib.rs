//! Crossrate Conversion Engine
//!
//! Converts monetary amounts between currencies using either a static
//! rate table or rates fetched through a chain of exchange-rate
//! backends, with hour-bucketed caching to limit network calls.
//!
//! # Features
//!
//! - Static [`RateTable`] with single-hop pivot conversion through a
//!   designated pivot currency (EUR by default)
//! - Hour-bucketed [`RateCache`]: entries expire structurally when the
//!   wall clock enters a new hour
//! - Ordered backend fallback chain with built-in default rates when
//!   every backend fails
//! - HTTP transport is injected, never owned by the engine
//!
//! # Example
//!
//! ```rust,ignore
//! use crossrate_common::{registry, Money};
//! use crossrate_fx::RateTable;
//! use rust_decimal_macros::dec;
//!
//! let table = RateTable::with_default_rates();
//! let eur = Money::new(dec!(1000), registry::eur().clone());
//! let usd = table.convert(&eur, registry::usd())?;
//! ```

pub mod backend;
pub mod cache;
pub mod converter;
pub mod defaults;
pub mod error;
pub mod provider;
pub mod table;

pub use backend::{Backend, HttpTransport, ResponseShape};
pub use cache::{CacheInfo, RateCache, RateMap};
pub use converter::{Conversion, EnhancedConverter};
pub use error::{BackendError, FxError, FxResult};
pub use provider::{ProviderConfig, RateProviderChain};
pub use table::{PairKey, RateTable};
