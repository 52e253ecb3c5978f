//! Exchange-rate backends and the injected HTTP transport seam.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use crate::cache::RateMap;
use crate::error::BackendError;

/// The transport capability injected by the embedding application.
///
/// The engine never owns an HTTP client; it hands a fully-formed URL to
/// the transport and expects a parsed JSON body back. Non-2xx statuses
/// and I/O failures are reported as [`BackendError::Transport`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET and return the JSON response body.
    async fn get_json(&self, url: &str) -> Result<Value, BackendError>;
}

/// How a backend flags success and where it puts its rates.
///
/// One variant per observed wire shape; adding a backend with a new
/// shape means adding a variant here, not editing a dispatch function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{"result": "success", "rates": {...}}`
    ResultFlag,
    /// `{"success": true, "rates": {...}}`
    SuccessFlag,
}

impl ResponseShape {
    /// Parse a response body into a rate map.
    ///
    /// Any missing flag, missing `rates` object or non-numeric rate is a
    /// [`BackendError::MalformedResponse`]; the chain treats it like any
    /// other backend failure.
    pub fn parse(&self, body: &Value) -> Result<RateMap, BackendError> {
        let ok = match self {
            Self::ResultFlag => body.get("result").and_then(Value::as_str) == Some("success"),
            Self::SuccessFlag => body.get("success").and_then(Value::as_bool) == Some(true),
        };
        if !ok {
            return Err(BackendError::MalformedResponse);
        }

        let rates = body
            .get("rates")
            .and_then(Value::as_object)
            .ok_or(BackendError::MalformedResponse)?;

        let mut map = RateMap::with_capacity(rates.len());
        for (code, value) in rates {
            if !value.is_number() {
                return Err(BackendError::MalformedResponse);
            }
            // String round-trip keeps the quoted decimal digits exact.
            let rate: Decimal = value
                .to_string()
                .parse()
                .map_err(|_| BackendError::MalformedResponse)?;
            map.insert(code.clone(), rate);
        }
        Ok(map)
    }
}

/// A single exchange-rate backend: name, URL template and wire shape.
#[derive(Debug, Clone)]
pub struct Backend {
    /// Backend name, used for logging only.
    pub name: &'static str,
    /// URL template with `{base}` and `{key}` placeholders.
    pub url_template: &'static str,
    /// Whether the backend is unusable without an API key.
    pub requires_api_key: bool,
    /// Response shape for parsing.
    pub shape: ResponseShape,
}

impl Backend {
    /// The default chain, in priority order.
    pub fn default_chain() -> Vec<Backend> {
        vec![
            Backend {
                name: "exchangerate-api",
                url_template: "https://open.er-api.com/v6/latest/{base}",
                requires_api_key: false,
                shape: ResponseShape::ResultFlag,
            },
            Backend {
                name: "fixer",
                url_template: "http://data.fixer.io/api/latest?access_key={key}&base={base}",
                requires_api_key: true,
                shape: ResponseShape::SuccessFlag,
            },
            Backend {
                name: "exchangerate-host",
                url_template: "https://api.exchangerate.host/latest?base={base}",
                requires_api_key: false,
                shape: ResponseShape::SuccessFlag,
            },
        ]
    }

    /// Expand the URL template for a base currency.
    pub fn url(&self, base_code: &str, api_key: Option<&str>) -> String {
        self.url_template
            .replace("{base}", base_code)
            .replace("{key}", api_key.unwrap_or(""))
    }

    /// Fetch and parse rates for a base currency.
    ///
    /// The transport call is bounded by `timeout`; an elapsed timer is a
    /// backend failure like any other.
    pub async fn fetch(
        &self,
        transport: &dyn HttpTransport,
        base_code: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<RateMap, BackendError> {
        if self.requires_api_key && api_key.is_none() {
            return Err(BackendError::MissingApiKey);
        }

        let url = self.url(base_code, api_key);
        debug!(backend = self.name, url = %url, "fetching rates");

        let body = tokio::time::timeout(timeout, transport.get_json(&url))
            .await
            .map_err(|_| BackendError::Timeout)??;

        self.shape.parse(&body)
    }
}
