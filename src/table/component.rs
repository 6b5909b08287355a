//! The market table: query state, fetch state and the fetch cycle tying them
//! together.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::DEFAULT_PAGINATION_TOTAL;
use crate::error::QueryError;
use crate::market::{Currency, MarketSource, SortOrder};
use crate::metrics;

use super::columns::{columns, render_rows, Cell, Column};
use super::pagination::PaginationControl;
use super::query::{PageSize, QueryState};
use super::state::{FetchFailure, FetchState};

#[derive(Debug, Default)]
struct TableState {
    query: QueryState,
    fetch: FetchState,
    mounted: bool,
    settled: u64,
}

/// Point-in-time copy of everything the table renders.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub query: QueryState,
    pub fetch: FetchState,
    pub columns: [Column; 3],
    pub pagination: PaginationControl,
    /// Fetches that have settled since mount.
    pub settled: u64,
}

impl TableSnapshot {
    /// Rows rendered through the column schema of the selected currency.
    pub fn rendered_rows(&self) -> Vec<[Cell; 3]> {
        render_rows(&self.fetch.rows, self.query.currency)
    }
}

/// Clears the loading flag on every exit path of a fetch, including a dropped
/// future.
struct LoadingGuard<'a> {
    state: &'a RwLock<TableState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.write();
        state.fetch.finish();
        state.settled += 1;
    }
}

/// Paginated, sortable market listing.
///
/// Cloning is cheap and every clone drives the same table. Overlapping
/// fetches are not cancelled; the last one to resolve decides the rows.
pub struct MarketTable<S> {
    source: Arc<S>,
    state: Arc<RwLock<TableState>>,
    pagination_total: u32,
}

impl<S> Clone for MarketTable<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            state: Arc::clone(&self.state),
            pagination_total: self.pagination_total,
        }
    }
}

impl<S: MarketSource> MarketTable<S> {
    /// Create an unmounted table over a listing source.
    pub fn new(source: S) -> Self {
        Self::with_pagination_total(source, DEFAULT_PAGINATION_TOTAL)
    }

    /// Create a table whose pagination control reports `total` items.
    pub fn with_pagination_total(source: S, total: u32) -> Self {
        Self {
            source: Arc::new(source),
            state: Arc::new(RwLock::new(TableState::default())),
            pagination_total: total,
        }
    }

    /// The listing source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// First render: fetch once with the default query. Later calls do nothing.
    pub async fn mount(&self) -> Option<Result<usize, FetchFailure>> {
        let query = {
            let mut state = self.state.write();
            if state.mounted {
                return None;
            }
            state.mounted = true;
            state.query = QueryState::default();
            state.query
        };
        Some(self.fetch_page(query).await)
    }

    /// Fetch one page and apply the outcome.
    ///
    /// On success the rows are replaced; on failure the error is recorded and
    /// the previous rows stay. Returns the row count or the recorded failure.
    #[instrument(
        skip(self),
        fields(
            page = query.page,
            page_size = %query.page_size,
            currency = %query.currency,
            order = %query.sort_order
        )
    )]
    pub async fn fetch_page(&self, query: QueryState) -> Result<usize, FetchFailure> {
        self.state.write().fetch.begin();
        let _loading = LoadingGuard { state: &self.state };
        let _timer = metrics::timer_market_fetch();
        metrics::inc_market_fetches();

        let outcome = self.source.fetch_markets(query).await;

        let mut state = self.state.write();
        let result = match outcome {
            Ok(records) => {
                let count = state.fetch.succeed(records);
                info!(count, "Market page loaded");
                Ok(count)
            }
            Err(err) => {
                let failure = FetchFailure::from(&err);
                warn!(kind = %failure.kind, error = %failure.message, "Market page fetch failed");
                metrics::inc_market_fetch_failures(failure.kind);
                state.fetch.fail(failure.clone());
                Err(failure)
            }
        };
        drop(state);

        result
    }

    /// Select a currency: page resets to 1. Returns the query to fetch.
    pub fn set_currency(&self, currency: Currency) -> QueryState {
        self.update_query(|query| query.with_currency(currency))
    }

    /// Select a sort order: page resets to 1. Returns the query to fetch.
    pub fn set_sort_order(&self, sort_order: SortOrder) -> QueryState {
        self.update_query(|query| query.with_sort_order(sort_order))
    }

    /// Apply a pagination choice as-is. Returns the query to fetch.
    pub fn set_pagination(&self, page: u32, page_size: PageSize) -> Result<QueryState, QueryError> {
        let next = self.query().with_pagination(page, page_size)?;
        Ok(self.update_query(|_| next))
    }

    /// Currency selector changed: update the query and fetch.
    pub async fn on_currency_change(&self, currency: Currency) -> Result<usize, FetchFailure> {
        let query = self.set_currency(currency);
        self.fetch_page(query).await
    }

    /// Sort selector changed: update the query and fetch.
    pub async fn on_sort_order_change(&self, sort_order: SortOrder) -> Result<usize, FetchFailure> {
        let query = self.set_sort_order(sort_order);
        self.fetch_page(query).await
    }

    /// Pagination control changed page and/or page size: update the query
    /// and fetch.
    pub async fn on_pagination_change(
        &self,
        page: u32,
        page_size: PageSize,
    ) -> Result<Result<usize, FetchFailure>, QueryError> {
        let query = self.set_pagination(page, page_size)?;
        Ok(self.fetch_page(query).await)
    }

    /// Current query state.
    pub fn query(&self) -> QueryState {
        self.state.read().query
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.read().fetch.loading
    }

    /// Whether at least one fetch has settled.
    pub fn is_ready(&self) -> bool {
        self.state.read().settled > 0
    }

    /// Copy of everything the table renders.
    pub fn snapshot(&self) -> TableSnapshot {
        let state = self.state.read();
        TableSnapshot {
            query: state.query,
            fetch: state.fetch.clone(),
            columns: columns(state.query.currency),
            pagination: PaginationControl::new(&state.query, self.pagination_total),
            settled: state.settled,
        }
    }

    fn update_query(&self, change: impl FnOnce(QueryState) -> QueryState) -> QueryState {
        let mut state = self.state.write();
        state.query = change(state.query);
        debug!(query = ?state.query, "Query state changed");
        state.query
    }
}
