//! Pagination control bound to the query state.

use serde::Serialize;

use super::query::{PageSize, QueryState};

/// Pages shown on each side of the current page.
const WINDOW: u32 = 2;

/// One entry of the page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page navigation plus page-size selector.
///
/// `total` is a configured placeholder: the listing endpoint reports no real
/// record count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControl {
    pub current: u32,
    pub page_size: PageSize,
    pub total: u32,
    pub page_size_options: [PageSize; 5],
}

impl PaginationControl {
    /// Bind the control to a query.
    pub fn new(query: &QueryState, total: u32) -> Self {
        Self {
            current: query.page,
            page_size: query.page_size,
            total,
            page_size_options: PageSize::ALL,
        }
    }

    /// Number of pages the placeholder total spans at this page size.
    pub fn page_count(&self) -> u32 {
        self.total.div_ceil(self.page_size.get()).max(1)
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.page_count()
    }

    /// First page, last page and a window around the current page, with
    /// ellipses for the gaps.
    pub fn items(&self) -> Vec<PageItem> {
        let last = self.page_count();
        let current = self.current.clamp(1, last);
        let start = current.saturating_sub(WINDOW).max(1);
        let end = (current + WINDOW).min(last);

        let mut items = Vec::new();
        if start > 1 {
            items.push(PageItem::Page(1));
            if start > 2 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.extend((start..=end).map(PageItem::Page));
        if end < last {
            if end < last - 1 {
                items.push(PageItem::Ellipsis);
            }
            items.push(PageItem::Page(last));
        }
        items
    }
}
