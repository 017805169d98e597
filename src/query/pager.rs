//! Pagination arithmetic

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
};

/// Validated page position of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: i64,
    limit: i64,
}

impl Pager {
    /// Build a pager from raw request values.
    ///
    /// `page` defaults to 1 and `limit` to the configured page size. Values
    /// below 1 are rejected; there is no upper bound on `limit`.
    pub fn new(page: Option<i64>, limit: Option<i64>, settings: &CatalogConfig) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(settings.default_page_size);

        if page < 1 {
            return Err(AppError::Validation(format!("Invalid page: {} (must be >= 1)", page)));
        }
        if limit < 1 {
            return Err(AppError::Validation(format!("Invalid limit: {} (must be >= 1)", limit)));
        }
        if (page - 1).checked_mul(limit).is_none() {
            return Err(AppError::Validation(format!("Invalid page: {} (out of range)", page)));
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of records to skip: (page - 1) * limit
    pub fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// ceil(total / limit); 0 when there are no matches
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total - 1) / self.limit + 1
    }
}
