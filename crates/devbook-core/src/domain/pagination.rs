//! Page windows for list queries.
//!
//! Pages are 1-based: `offset = (page - 1) * limit`. Both `limit` and `page`
//! are clamped to positive integers; missing, malformed, zero or negative
//! values fall back to the defaults. `limit` is capped at [`MAX_LIMIT`] and the
//! offset never exceeds `i64::MAX`, the largest value Postgres can bind.

/// Page size used when the caller gives none (or an invalid one).
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest page size served in one response.
pub const MAX_LIMIT: u64 = 100;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    limit: u64,
    page: u64,
}

impl Pagination {
    pub fn new(limit: u64, page: u64) -> Self {
        Self {
            limit: if limit == 0 {
                DEFAULT_LIMIT
            } else {
                limit.min(MAX_LIMIT)
            },
            page: page.max(1),
        }
    }

    /// Parse raw query-string values.
    pub fn from_params(limit: Option<&str>, page: Option<&str>) -> Self {
        Self::new(
            parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
            parse_positive(page).unwrap_or(1),
        )
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .checked_mul(self.limit)
            .map_or(MAX_OFFSET, |offset| offset.min(MAX_OFFSET))
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 1)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as u64)
}
