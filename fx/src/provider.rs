//! Ordered backend fallback chain with cached and default rates.

use std::sync::Arc;
use std::time::Duration;

use crossrate_common::Currency;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, HttpTransport};
use crate::cache::{CacheInfo, RateCache, RateMap};
use crate::defaults;

/// Configuration for the provider chain.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Backends in priority order.
    pub backends: Vec<Backend>,
    /// API key for backends that need one.
    pub api_key: Option<String>,
    /// Per-backend fetch timeout.
    pub fetch_timeout: Duration,
    /// Whether to consult and populate the hour-bucket cache.
    pub use_cache: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            backends: Backend::default_chain(),
            api_key: None,
            fetch_timeout: Duration::from_secs(10),
            use_cache: true,
        }
    }
}

/// Produces rate maps for a base currency by trying backends in order.
///
/// Lookup order: hour-bucket cache, then each backend (skipping any that
/// needs a missing API key), then the built-in default table. The
/// default table always answers for the seven predefined currencies, so
/// only bases outside it can come back empty.
///
/// A single async guard serializes the miss path: concurrent callers
/// that both miss the cache will not issue duplicate backend fetches,
/// because the second re-checks the cache after acquiring the guard.
pub struct RateProviderChain {
    config: ProviderConfig,
    transport: Arc<dyn HttpTransport>,
    cache: RateCache,
    fetch_guard: Mutex<()>,
}

impl RateProviderChain {
    /// Create a chain with the default configuration.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self::with_config(transport, ProviderConfig::default())
    }

    /// Create a chain with a custom configuration.
    pub fn with_config(transport: Arc<dyn HttpTransport>, config: ProviderConfig) -> Self {
        Self {
            config,
            transport,
            cache: RateCache::new(),
            fetch_guard: Mutex::new(()),
        }
    }

    /// All known rates for the base currency.
    #[instrument(skip_all, fields(base = base.code()))]
    pub async fn exchange_rates(&self, base: &Currency) -> RateMap {
        if self.config.use_cache {
            if let Some(rates) = self.cache.get(base.code()) {
                return rates;
            }
        }

        let _guard = self.fetch_guard.lock().await;

        // Another caller may have fetched while this one waited.
        if self.config.use_cache {
            if let Some(rates) = self.cache.get(base.code()) {
                return rates;
            }
        }

        match self.fetch_from_backends(base.code()).await {
            Some(rates) => {
                if self.config.use_cache {
                    self.cache.put(base.code(), rates.clone());
                }
                rates
            }
            None => {
                warn!(base = base.code(), "all backends failed, using default rates");
                defaults::fallback_rates(base.code())
            }
        }
    }

    async fn fetch_from_backends(&self, base_code: &str) -> Option<RateMap> {
        for backend in &self.config.backends {
            if backend.requires_api_key && self.config.api_key.is_none() {
                debug!(backend = backend.name, "skipping backend, no API key configured");
                continue;
            }

            match backend
                .fetch(
                    self.transport.as_ref(),
                    base_code,
                    self.config.api_key.as_deref(),
                    self.config.fetch_timeout,
                )
                .await
            {
                Ok(rates) => {
                    debug!(
                        backend = backend.name,
                        count = rates.len(),
                        "backend answered"
                    );
                    return Some(rates);
                }
                Err(error) => {
                    warn!(backend = backend.name, error = %error, "backend failed");
                }
            }
        }
        None
    }

    /// The rate from one currency to another, if known.
    pub async fn single_rate(&self, from: &Currency, to: &Currency) -> Option<Decimal> {
        self.exchange_rates(from).await.get(to.code()).copied()
    }

    /// Drop all cached rates.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Snapshot of the cache state.
    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }
}
