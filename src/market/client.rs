//! CoinGecko markets listing client.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::FetchError;
use crate::table::QueryState;

use super::types::MarketRecord;

/// Longest error body kept in a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// Anything that can answer a listing query with one page of records.
pub trait MarketSource: Send + Sync + 'static {
    /// Fetch one page of market records for the query.
    fn fetch_markets(
        &self,
        query: QueryState,
    ) -> impl Future<Output = Result<Vec<MarketRecord>, FetchError>> + Send;
}

/// HTTP client for the `/coins/markets` endpoint.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Full markets endpoint URL.
    markets_url: String,
}

impl CoinGeckoClient {
    /// Create a client from config. No timeout unless one is configured.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("coin-markets/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90));

        if let Some(timeout_ms) = config.http_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            http: builder.build()?,
            markets_url: config.markets_api_url.clone(),
        })
    }

    /// Validate the configuration, then build the client.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        config.validate()?;
        Ok(Self::new(config)?)
    }

    /// Get the markets endpoint URL.
    pub fn markets_url(&self) -> &str {
        &self.markets_url
    }

    /// Get one page of the market listing.
    #[instrument(skip(self), fields(url = %self.markets_url))]
    pub async fn get_markets(&self, query: QueryState) -> Result<Vec<MarketRecord>, FetchError> {
        let response = self
            .http
            .get(&self.markets_url)
            .header("accept", "application/json")
            .query(&listing_params(&query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        let records = decode_listing(&body)?;
        debug!(count = records.len(), "Decoded market listing");

        Ok(records)
    }
}

impl MarketSource for CoinGeckoClient {
    async fn fetch_markets(&self, query: QueryState) -> Result<Vec<MarketRecord>, FetchError> {
        self.get_markets(query).await
    }
}

/// Translate a table query into the endpoint's query string parameters.
pub fn listing_params(query: &QueryState) -> [(&'static str, String); 5] {
    [
        ("vs_currency", query.currency.code().to_string()),
        ("order", query.sort_order.api_param().to_string()),
        ("per_page", query.page_size.get().to_string()),
        ("page", query.page.to_string()),
        ("sparkline", "false".to_string()),
    ]
}

/// Decode a listing body. Only a JSON array is accepted; any other JSON value
/// is a format error, never coerced.
pub fn decode_listing(body: &str) -> Result<Vec<MarketRecord>, FetchError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<MarketRecord>)
            .collect::<Result<Vec<MarketRecord>, _>>()
            .map_err(FetchError::from),
        other => Err(FetchError::Format {
            found: json_type(&other),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
