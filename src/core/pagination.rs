//! Page arithmetic for historical rate series.

use crate::core::error::{RateError, RateResult};

/// A 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    pub const DEFAULT_SIZE: usize = 10;

    /// Builds a request, rejecting a zero page or page size.
    pub fn new(page: usize, page_size: usize) -> RateResult<Self> {
        if page < 1 || page_size < 1 {
            return Err(RateError::InvalidPagination { page, page_size });
        }
        Ok(PageRequest { page, page_size })
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.page_size)
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            page_size: Self::DEFAULT_SIZE,
        }
    }
}
