//! Market table module.
//!
//! This module handles:
//! - Query state (page, page size, currency, sort order) and its transitions
//! - Fetch state (loading, last error, rows keyed by record id)
//! - The fixed column schema and the pagination control
//! - `MarketTable`, which runs the fetch cycle

pub mod columns;
pub mod component;
pub mod pagination;
pub mod query;
pub mod state;

pub use columns::{columns, render_rows, Cell, Column, ColumnKey, ICON_WIDTH_PX};
pub use component::{MarketTable, TableSnapshot};
pub use pagination::{PageItem, PaginationControl};
pub use query::{PageSize, QueryState};
pub use state::{FetchFailure, FetchState, TableRow};
