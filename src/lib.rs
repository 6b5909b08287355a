//! Paginated, sortable cryptocurrency market dashboard.
//!
//! The library keeps a market table in sync with the CoinGecko
//! `/coins/markets` listing: one page of records per fetch, with page, page
//! size, quote currency and market-cap order chosen by the user.
//!
//! ```text
//! control change ──► QueryState ──► MarketSource::fetch_markets ──► FetchState
//!                                                                     │
//!                         columns + pagination ◄──── TableSnapshot ◄──┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Listing records, the CoinGecko client and a scripted mock
//! - [`table`]: Query state, fetch state, columns, pagination and the table
//! - [`api`]: HTTP dashboard, JSON snapshot, health and metrics
//! - [`viewer`]: Read-only view of the application source
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod table;
pub mod utils;
pub mod viewer;

pub use config::Config;
pub use error::{AppError, Result};
pub use market::{CoinGeckoClient, MarketSource};
pub use table::{MarketTable, QueryState};
