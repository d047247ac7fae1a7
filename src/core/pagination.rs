//! Pagination planning and next/previous page metadata

use serde::Serialize;

/// Page used when `page` is missing or unusable
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when `limit` is missing or unusable
pub const DEFAULT_LIMIT: u64 = 1;

/// One page of results expressed as an offset window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationWindow {
    /// Page number (starts at 1)
    pub page: u64,
    /// Requested page size
    pub limit: u64,
    /// Records skipped before the page: `(page - 1) * limit`
    pub skip: u64,
    /// Records fetched for the page
    pub take: u64,
}

/// Reference to a neighbouring page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Pagination metadata returned with every list response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaginationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// Turns raw `page`/`limit` values into windows
///
/// Bad input never fails: anything that does not parse to a positive integer
/// falls back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPlanner {
    default_limit: u64,
    max_limit: Option<u64>,
}

impl Default for PaginationPlanner {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: None,
        }
    }
}

impl PaginationPlanner {
    /// Planner with a custom default page size and optional upper bound
    pub fn new(default_limit: u64, max_limit: Option<u64>) -> Self {
        Self {
            default_limit: default_limit.max(1),
            max_limit: max_limit.map(|max| max.max(1)),
        }
    }

    /// Build the window for the requested page
    pub fn plan(&self, raw_page: Option<&str>, raw_limit: Option<&str>) -> PaginationWindow {
        let page = raw_page.and_then(parse_positive).unwrap_or(DEFAULT_PAGE);
        let mut limit = raw_limit
            .and_then(parse_positive)
            .unwrap_or(self.default_limit);
        if let Some(max) = self.max_limit {
            limit = limit.min(max);
        }

        PaginationWindow {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
            take: limit,
        }
    }

    /// Compute next/previous page references for `total` records
    pub fn describe(&self, window: &PaginationWindow, total: u64) -> PaginationResult {
        let next = (window.skip.saturating_add(window.take) < total).then(|| PageRef {
            page: window.page + 1,
            limit: window.limit,
        });
        let prev = (window.skip > 0).then(|| PageRef {
            page: window.page - 1,
            limit: window.limit,
        });

        PaginationResult { next, prev }
    }
}

/// Parse the leading base-10 integer of `raw`, keeping only positive values
///
/// Leading whitespace and a sign are accepted and trailing text is ignored,
/// so `"3abc"` is 3 while `"abc"`, `"0"` and `"-2"` are rejected.
fn parse_positive(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let value: u64 = unsigned[..digits_end].parse().ok()?;

    if negative || value == 0 {
        return None;
    }
    Some(value)
}
