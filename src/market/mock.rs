//! Mock market source for unit testing.
//!
//! This module provides a listing source that can be used in tests
//! without making real network requests. Queued responses are served first;
//! once the queue is empty the mock answers from a deterministic, stable
//! universe of generated assets.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::FetchError;
use crate::market::client::{decode_listing, MarketSource};
use crate::table::QueryState;

use super::types::{Currency, MarketRecord, SortOrder};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return these records.
    Records(Vec<MarketRecord>),
    /// Return a raw body, decoded exactly as the HTTP client would.
    Body(String),
    /// Fail with a non-success status.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Configuration for mock source behavior.
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Number of assets in the generated universe.
    pub universe: u32,
    /// Simulated latency in milliseconds for every call.
    pub latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            universe: 250,
            latency_ms: 0,
        }
    }
}

#[derive(Debug)]
struct Scripted {
    response: MockResponse,
    delay: Duration,
}

/// Mock market source for testing.
#[derive(Debug, Clone)]
pub struct MockMarketSource {
    /// Mock configuration.
    config: MockConfig,
    /// Scripted responses, served in order.
    script: Arc<Mutex<VecDeque<Scripted>>>,
    /// Every query received, in call order.
    calls: Arc<Mutex<Vec<QueryState>>>,
}

impl MockMarketSource {
    /// Create a new mock source with default configuration.
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a mock source with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response for the next call.
    pub fn push_response(&self, response: MockResponse) {
        self.push_delayed(response, Duration::ZERO);
    }

    /// Queue a response that resolves only after `delay`.
    pub fn push_delayed(&self, response: MockResponse, delay: Duration) {
        self.script.lock().push_back(Scripted { response, delay });
    }

    /// Queries received so far.
    pub fn calls(&self) -> Vec<QueryState> {
        self.calls.lock().clone()
    }

    /// Number of queries received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Clear recorded calls and queued responses.
    pub fn clear(&self) {
        self.calls.lock().clear();
        self.script.lock().clear();
    }

    /// The page the generated universe yields for a query.
    pub fn generated_page(&self, query: &QueryState) -> Vec<MarketRecord> {
        let size = query.page_size.get();
        let skip = query.page.saturating_sub(1).saturating_mul(size);
        let ranks: Box<dyn Iterator<Item = u32>> = match query.sort_order {
            SortOrder::MarketCapDesc => Box::new(1..=self.config.universe),
            SortOrder::MarketCapAsc => Box::new((1..=self.config.universe).rev()),
        };

        ranks
            .skip(skip as usize)
            .take(size as usize)
            .map(|rank| generated_record(rank, self.config.universe, query.currency))
            .collect()
    }
}

impl Default for MockMarketSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketSource for MockMarketSource {
    async fn fetch_markets(&self, query: QueryState) -> Result<Vec<MarketRecord>, FetchError> {
        self.calls.lock().push(query);
        let scripted = self.script.lock().pop_front();

        let delay = Duration::from_millis(self.config.latency_ms)
            + scripted.as_ref().map(|s| s.delay).unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match scripted.map(|s| s.response) {
            None => Ok(self.generated_page(&query)),
            Some(MockResponse::Records(records)) => Ok(records),
            Some(MockResponse::Body(body)) => decode_listing(&body),
            Some(MockResponse::Status { status, body }) => Err(FetchError::Status { status, body }),
        }
    }
}

/// Build a minimal record with the given identifier and price.
pub fn mock_record(id: &str, price: Decimal) -> MarketRecord {
    MarketRecord {
        id: id.to_string(),
        symbol: id.chars().take(3).collect(),
        name: capitalize(id),
        image: format!("https://assets.example.com/{}.png", id),
        current_price: Some(price),
        market_cap: price.to_f64().map(|p| p * 1_000_000.0),
        market_cap_rank: None,
        fully_diluted_valuation: None,
        total_volume: None,
        high_24h: None,
        low_24h: None,
        price_change_24h: None,
        price_change_percentage_24h: None,
        market_cap_change_24h: None,
        market_cap_change_percentage_24h: None,
        circulating_supply: Some(1_000_000.0),
        total_supply: None,
        max_supply: None,
        ath: None,
        ath_change_percentage: None,
        ath_date: None,
        atl: None,
        atl_change_percentage: None,
        atl_date: None,
        roi: None,
        last_updated: None,
    }
}

fn generated_record(rank: u32, universe: u32, currency: Currency) -> MarketRecord {
    let base = Decimal::from(universe - rank + 1);
    let rate = match currency {
        Currency::Usd => Decimal::ONE,
        Currency::Eur => Decimal::new(92, 2),
        Currency::Gbp => Decimal::new(79, 2),
        Currency::Jpy => Decimal::new(150, 0),
    };

    let mut record = mock_record(&format!("coin-{}", rank), base * rate);
    record.market_cap_rank = Some(rank);
    record
}

fn capitalize(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
