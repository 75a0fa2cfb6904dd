//! Page/size pagination.
//!
//! List endpoints take 1-based `page` and `size` query parameters; the
//! repositories take offset/limit. This module is the pure translation
//! between the two plus the bounds checks.

use thiserror::Error;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Out-of-bounds page or size. Surfaces as 400 at the API boundary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageError {
    #[error("page must be at least 1")]
    PageOutOfRange,

    #[error("size must be between 1 and {MAX_PAGE_SIZE}")]
    SizeOutOfRange,
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u32,
    pub size: u32,
}

impl PageParams {
    /// Apply defaults and bounds to raw query values.
    pub fn new(page: Option<u32>, size: Option<u32>) -> Result<Self, PageError> {
        let page = page.unwrap_or(1);
        let size = size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(PageError::PageOutOfRange);
        }
        if size < 1 || size > MAX_PAGE_SIZE {
            return Err(PageError::SizeOutOfRange);
        }

        Ok(Self { page, size })
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.size as i64
    }

    /// Rows in one page.
    pub fn limit(&self) -> i64 {
        self.size as i64
    }

    /// Whether rows exist past this page, given the total matching count.
    pub fn has_next(&self, total: u64) -> bool {
        (self.page as u64) * (self.size as u64) < total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let p = PageParams::new(None, None).unwrap();
        assert_eq!(p.page, 1);
        assert_eq!(p.size, DEFAULT_PAGE_SIZE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn page_zero_is_rejected() {
        assert_eq!(PageParams::new(Some(0), None), Err(PageError::PageOutOfRange));
    }

    #[test]
    fn size_bounds_are_enforced() {
        assert_eq!(
            PageParams::new(None, Some(0)),
            Err(PageError::SizeOutOfRange)
        );
        assert_eq!(
            PageParams::new(None, Some(MAX_PAGE_SIZE + 1)),
            Err(PageError::SizeOutOfRange)
        );
        assert!(PageParams::new(None, Some(MAX_PAGE_SIZE)).is_ok());
    }

    #[test]
    fn window_of_25_records_in_pages_of_10() {
        // Page 1 of 25: full window, more pages remain.
        let p1 = PageParams::new(Some(1), Some(10)).unwrap();
        assert_eq!((p1.offset(), p1.limit()), (0, 10));
        assert!(p1.has_next(25));

        // Page 3 of 25: last 5 rows, nothing further.
        let p3 = PageParams::new(Some(3), Some(10)).unwrap();
        assert_eq!((p3.offset(), p3.limit()), (20, 10));
        assert!(!p3.has_next(25));
    }

    #[test]
    fn page_past_the_end_has_no_next() {
        let p = PageParams::new(Some(4), Some(10)).unwrap();
        assert_eq!(p.offset(), 30);
        assert!(!p.has_next(25));
    }
}
