//! Query parameters and pagination utilities

use super::error::ApiError;
use serde::{Deserialize, Serialize};

/// Default page when `page` is absent
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size when `limit` is absent
pub const DEFAULT_LIMIT: u64 = 10;

/// Raw pagination parameters as they arrive on the query string
///
/// Values stay as strings until [`PageParams::parse`] so a non-numeric value
/// is reported as an `InvalidArgument` instead of an extractor rejection.
///
/// # Example
/// ```text
/// GET /comments/{videoId}?page=2&limit=5
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn new(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: page.map(String::from),
            limit: limit.map(String::from),
        }
    }

    /// Validate into a [`PageRequest`]
    pub fn parse(&self) -> Result<PageRequest, ApiError> {
        Ok(PageRequest {
            page: parse_positive("page", self.page.as_deref(), DEFAULT_PAGE)?,
            limit: parse_positive("limit", self.limit.as_deref(), DEFAULT_LIMIT)?,
        })
    }
}

fn parse_positive(field: &str, raw: Option<&str>, default: u64) -> Result<u64, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<i64>() {
        Ok(value) if value >= 1 => Ok(value as u64),
        Ok(_) => Err(ApiError::invalid_field(
            field,
            format!("'{}' must be greater than or equal to 1", field),
        )),
        Err(_) => Err(ApiError::invalid_field(
            field,
            "Pagination params must be numbers",
        )),
    }
}

/// A validated page/limit pair (both ≥ 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of items to skip before this page
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: u64,

    /// Number of items per page
    pub limit: u64,

    /// Total number of items (independent of skip/limit)
    pub total: u64,

    /// Total number of pages
    pub total_pages: u64,

    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };

        Self {
            page: request.page,
            limit,
            total,
            total_pages,
            has_next: request.page < total_pages,
            has_prev: request.page > 1,
        }
    }
}

/// One page of a read model
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub docs: Vec<T>,
    pub total_docs: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(docs: Vec<T>, meta: PaginationMeta) -> Self {
        Self {
            docs,
            total_docs: meta.total,
            limit: meta.limit,
            page: meta.page,
            total_pages: meta.total_pages,
            has_prev_page: meta.has_prev,
            has_next_page: meta.has_next,
            prev_page: meta.has_prev.then(|| meta.page - 1),
            next_page: meta.has_next.then(|| meta.page + 1),
        }
    }
}
