//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Maximum page size accepted from clients.
const MAX_LIMIT: u32 = 100;

/// Request parameters for paginated queries.
///
/// `limit` is optional so each endpoint can apply its own default
/// (20 for notifications, 10 for posts and reviews).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default)]
    pub page: Option<u32>,
    /// Number of items per page.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageRequest {
    /// Create a new page request.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Resolve the page number, clamped to at least 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Resolve the page size using the endpoint default.
    pub fn limit_or(&self, default: u32) -> u32 {
        self.limit.unwrap_or(default).clamp(1, MAX_LIMIT)
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset_for(&self, default_limit: u32) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit_or(default_limit))
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u32,
    /// Number of items per page.
    pub limit: u32,
    /// Total number of items across all pages.
    pub total: i64,
    /// Total number of pages.
    pub total_pages: i64,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: u32, limit: u32, total: i64) -> Self {
        let limit_i = i64::from(limit.max(1));
        let total_pages = if total <= 0 {
            0
        } else {
            (total + limit_i - 1) / limit_i
        };
        Self {
            items,
            page,
            limit,
            total,
            total_pages,
        }
    }

    /// Map the items while keeping the paging metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_per_endpoint() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit_or(20), 20);
        assert_eq!(req.offset_for(20), 0);
    }

    #[test]
    fn offset_uses_resolved_limit() {
        let req = PageRequest::new(3, 10);
        assert_eq!(req.offset_for(20), 20);
    }

    #[test]
    fn limit_is_clamped() {
        let req = PageRequest::new(0, 10_000);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit_or(20), 100);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = PageResponse::new(vec![1, 2], 1, 10, 21);
        assert_eq!(page.total_pages, 3);
        let empty: PageResponse<u8> = PageResponse::new(vec![], 1, 10, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
