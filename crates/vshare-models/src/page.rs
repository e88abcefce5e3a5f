//! Pagination envelope shared by list and search responses.

use serde::{Deserialize, Serialize};

/// A page of items plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, page_size: u32) -> Self {
        let total_pages = (total + page_size as i64 - 1) / page_size.max(1) as i64;
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn empty(page: u32, page_size: u32) -> Self {
        Self::new(Vec::new(), 0, page, page_size)
    }
}

/// Deepest reachable page; the search index caps its result window
/// anyway, and `page * page_size` must stay well inside `u32`.
pub const MAX_PAGE: u32 = 10_000;

/// Clamp raw pagination parameters to sane bounds.
pub fn clamp_pagination(page: u32, page_size: u32) -> (u32, u32) {
    let page = page.clamp(1, MAX_PAGE);
    let page_size = if page_size == 0 || page_size > 100 {
        20
    } else {
        page_size
    };
    (page, page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let p: Page<i32> = Page::new(vec![], 21, 1, 10);
        assert_eq!(p.total_pages, 3);
        let p: Page<i32> = Page::new(vec![], 20, 1, 10);
        assert_eq!(p.total_pages, 2);
    }

    #[test]
    fn test_clamp_pagination() {
        assert_eq!(clamp_pagination(0, 0), (1, 20));
        assert_eq!(clamp_pagination(2, 500), (2, 20));
        assert_eq!(clamp_pagination(3, 50), (3, 50));
    }

    #[test]
    fn test_clamp_pagination_caps_page_depth() {
        assert_eq!(clamp_pagination(u32::MAX, 100), (MAX_PAGE, 100));
        // The offset computed downstream stays inside u32.
        let (page, page_size) = clamp_pagination(u32::MAX, u32::MAX);
        assert!((page - 1).checked_mul(page_size).is_some());
    }
}
