// Page slicing for the readings table
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// 1-based page actually served, after clamping. 0 when there are no pages.
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items: Vec<T>,
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Slice `[(page-1)*size, page*size)` out of `items`, clamping the requested
/// page into `[1, total_pages]` first.
pub fn paginate<T: Clone>(items: &[T], requested_page: i64, page_size: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    if total_pages == 0 {
        return Page {
            page: 0,
            page_size,
            total_pages,
            total_items,
            items: Vec::new(),
        };
    }

    let page = requested_page.clamp(1, total_pages as i64) as usize;
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        page,
        page_size,
        total_pages,
        total_items,
        items: items[start..end].to_vec(),
    }
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_items: self.total_items,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
