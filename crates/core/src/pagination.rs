//! Page windows for list endpoints.

use serde::{Deserialize, Serialize};

/// A validated request for one page of results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Build a page request from already-parsed numbers.
    ///
    /// `page` and `limit` must both be at least 1. `limit` is clamped to
    /// `max_limit`.
    pub fn new(page: u64, limit: u64, max_limit: u64) -> crate::Result<Self> {
        if page == 0 {
            return Err(crate::Error::InvalidPagination(
                "page must be a positive integer".to_string(),
            ));
        }
        if limit == 0 {
            return Err(crate::Error::InvalidPagination(
                "limit must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            page,
            limit: limit.min(max_limit.max(1)),
        })
    }

    /// Parse raw query-string values, applying defaults for missing ones.
    pub fn parse(page: Option<&str>, limit: Option<&str>, max_limit: u64) -> crate::Result<Self> {
        let page = parse_positive("page", page, crate::DEFAULT_PAGE)?;
        let limit = parse_positive("limit", limit, crate::DEFAULT_PAGE_LIMIT)?;
        Self::new(page, limit, max_limit)
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    /// The effective page size after clamping.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip. Saturates instead of overflowing for huge pages.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: crate::DEFAULT_PAGE,
            limit: crate::DEFAULT_PAGE_LIMIT,
        }
    }
}

fn parse_positive(name: &str, raw: Option<&str>, default: u64) -> crate::Result<u64> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };
    raw.parse::<u64>().map_err(|_| {
        crate::Error::InvalidPagination(format!("{name} must be a positive integer"))
    })
}

/// Pagination metadata returned alongside a page of results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_docs: u64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total_docs: u64) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            total_pages: total_docs.div_ceil(request.limit()),
            total_docs,
        }
    }
}
