//! Page-number pagination.

use quill_common::config::PaginationConfig;
use serde::Serialize;

/// A requested page (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Pagination {
    /// Build a page request from optional client values.
    ///
    /// Missing or zero pages become page 1; the page size falls back to the
    /// configured default and is capped at the configured maximum.
    #[must_use]
    pub fn new(page: Option<u64>, page_size: Option<u64>, config: PaginationConfig) -> Self {
        let max = config.max_page_size.max(1);
        let page_size = page_size
            .filter(|&s| s > 0)
            .unwrap_or(config.default_page_size)
            .clamp(1, max);

        Self {
            page: page.filter(|&p| p > 0).unwrap_or(1),
            page_size,
        }
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    /// Number of rows to fetch.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size
    }

    /// Wrap one page of results.
    #[must_use]
    pub fn page<T>(&self, results: Vec<T>, count: u64) -> Page<T> {
        Page {
            count,
            page: self.page,
            page_size: self.page_size,
            results,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None, PaginationConfig::default())
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub page: u64,
    pub page_size: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Convert the results, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            page: self.page,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
