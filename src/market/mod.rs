//! Market module for the CoinGecko listing endpoint.
//!
//! This module handles:
//! - Market record types and query vocabulary (currency, sort order)
//! - The listing client and the `MarketSource` seam
//! - Mock source for testing

pub mod client;
pub mod mock;
pub mod types;

pub use client::{decode_listing, listing_params, CoinGeckoClient, MarketSource};
pub use mock::{mock_record, MockConfig, MockMarketSource, MockResponse};
pub use types::{Currency, MarketRecord, Roi, SortOrder};
