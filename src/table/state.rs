//! Fetch state held by the market table.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::error::{FetchError, FetchErrorKind};
use crate::market::MarketRecord;

/// One table row: a record keyed by its identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Row key; always equal to `record.id`.
    pub key: String,
    #[serde(flatten)]
    pub record: MarketRecord,
}

impl From<MarketRecord> for TableRow {
    fn from(record: MarketRecord) -> Self {
        Self {
            key: record.id.clone(),
            record,
        }
    }
}

/// A recorded fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    pub kind: FetchErrorKind,
    /// The underlying failure's description.
    pub message: String,
}

impl From<&FetchError> for FetchFailure {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Loading flag, last error and last successful rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchState {
    /// True while any fetch is in flight.
    pub loading: bool,
    pub error: Option<FetchFailure>,
    pub rows: Vec<TableRow>,
    /// Fetches begun and not yet finished.
    #[serde(skip)]
    in_flight: u32,
}

impl FetchState {
    /// Mark a fetch as started.
    pub fn begin(&mut self) {
        self.in_flight += 1;
        self.loading = true;
    }

    /// Replace the rows with a fresh result set and clear the error.
    ///
    /// Rows are keyed by record id; a repeated id keeps its first row.
    /// Returns the number of rows kept.
    pub fn succeed(&mut self, records: Vec<MarketRecord>) -> usize {
        let mut seen = HashSet::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            if seen.insert(record.id.clone()) {
                rows.push(TableRow::from(record));
            } else {
                warn!(id = %record.id, "Dropping record with duplicate id");
            }
        }

        self.rows = rows;
        self.error = None;
        self.rows.len()
    }

    /// Record a failure. The previous rows stay untouched.
    pub fn fail(&mut self, failure: FetchFailure) {
        self.error = Some(failure);
    }

    /// Mark a fetch as settled. Loading stays on while others are in flight.
    pub fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }
}
