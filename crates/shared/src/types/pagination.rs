//! Page-based listing for accounts and journal entries.

use serde::{Deserialize, Serialize};

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page a single list call returns.
pub const MAX_PER_PAGE: u32 = 500;

/// One-based page selector for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Starts at 1.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PER_PAGE)
    }
}

impl PageRequest {
    /// Builds a request and clamps it into range.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }.normalized()
    }

    /// The first page with the given size.
    #[must_use]
    pub fn first(per_page: u32) -> Self {
        Self::new(1, per_page)
    }

    /// Pages below 1 become 1; sizes are clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// Zero-based page index, as SeaORM paginators count pages.
    #[must_use]
    pub fn index(&self) -> u64 {
        u64::from(self.page.saturating_sub(1))
    }

    /// Row limit for one page.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.max(1))
    }
}

/// Where a page sits in the full result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page that was served.
    pub page: u32,
    /// Page size that was applied.
    pub per_page: u32,
    /// Matching rows across all pages.
    pub total: u64,
    /// Zero when nothing matched.
    pub total_pages: u32,
}

impl PageMeta {
    /// Computes the page count for `total` rows.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let request = request.normalized();
        let pages = total.div_ceil(request.limit());
        Self {
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
        }
    }

    /// Whether a later page holds more rows.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Page position.
    pub meta: PageMeta,
}

impl<T> PageResponse<T> {
    /// Wraps one page of rows.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            data,
            meta: PageMeta::new(request, total),
        }
    }

    /// Converts the rows, keeping the page position.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
