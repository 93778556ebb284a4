use std::ops::Range;

use crate::error::ServiceError;

pub const INVALID_PAGE: &str = "Invalid page or limit";

/// A 1-indexed page of `limit` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Result<Self, ServiceError> {
        if page == 0 || limit == 0 {
            return Err(ServiceError::bad_request(INVALID_PAGE));
        }
        Ok(Self { page, limit })
    }

    /// Zero-indexed item range of this page over `total` items.
    /// Pages past the end give an empty range.
    pub fn window(&self, total: u64) -> Range<u64> {
        let start = (self.page - 1).saturating_mul(self.limit).min(total);
        let end = start.saturating_add(self.limit).min(total);
        start..end
    }

    pub fn window_len(&self, total: u64) -> u64 {
        let window = self.window(total);
        window.end - window.start
    }
}
