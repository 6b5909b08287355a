//! Query state driving the next listing fetch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::market::{Currency, SortOrder};

/// Rows per page. The pagination control offers exactly these choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageSize {
    Five,
    #[default]
    Ten,
    Twenty,
    Fifty,
    Hundred,
}

impl PageSize {
    /// All page sizes in selector order.
    pub const ALL: [PageSize; 5] = [
        PageSize::Five,
        PageSize::Ten,
        PageSize::Twenty,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    /// Number of rows per page.
    pub fn get(self) -> u32 {
        match self {
            PageSize::Five => 5,
            PageSize::Ten => 10,
            PageSize::Twenty => 20,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = QueryError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(QueryError::InvalidPageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Page, page size, currency and sort order of the table.
///
/// Transitions return a new state; the table replaces its copy wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryState {
    /// 1-based page number.
    pub page: u32,
    pub page_size: PageSize,
    pub currency: Currency,
    pub sort_order: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            currency: Currency::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl QueryState {
    /// Build a query, rejecting page 0.
    pub fn new(
        page: u32,
        page_size: PageSize,
        currency: Currency,
        sort_order: SortOrder,
    ) -> Result<Self, QueryError> {
        if page == 0 {
            return Err(QueryError::InvalidPage(page));
        }
        Ok(Self {
            page,
            page_size,
            currency,
            sort_order,
        })
    }

    /// New currency; resets to the first page.
    pub fn with_currency(self, currency: Currency) -> Self {
        Self {
            page: 1,
            currency,
            ..self
        }
    }

    /// New sort order; resets to the first page.
    pub fn with_sort_order(self, sort_order: SortOrder) -> Self {
        Self {
            page: 1,
            sort_order,
            ..self
        }
    }

    /// New page and page size exactly as chosen in the pagination control.
    pub fn with_pagination(self, page: u32, page_size: PageSize) -> Result<Self, QueryError> {
        Self::new(page, page_size, self.currency, self.sort_order)
    }
}
