use serde::{Deserialize, Serialize};

use super::error::FieldErrors;
use crate::constants::MAX_PAGE_SIZE;

/// Which page of a list the caller asked for. `page` counts from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::default();
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if limit < 1 {
            errors.add("limit", "Page size must be at least 1.");
        } else if limit > MAX_PAGE_SIZE {
            errors.add("limit", &format!("Page size must not exceed {MAX_PAGE_SIZE}."));
        }
        if page < 1 {
            errors.add("page", "Page number must be at least 1.");
        } else if errors.is_empty() && (page - 1).checked_mul(limit).is_none() {
            errors.add("page", "Invalid page.");
        }

        errors.into_result()?;
        Ok(Self { page, limit })
    }

    /// Rows to skip. `new` guarantees this fits in an `i64`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: crate::constants::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn from_rows(results: Vec<T>, count: i64, request: &PageRequest) -> Self {
        let next = if request.offset().saturating_add(request.limit) < count {
            Some(request.page + 1)
        } else {
            None
        };
        let previous = if request.page > 1 {
            // a page past the end points back at the last real page
            let last = ((count.saturating_add(request.limit - 1)) / request.limit).max(1);
            Some((request.page - 1).min(last))
        } else {
            None
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}
