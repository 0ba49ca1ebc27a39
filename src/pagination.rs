//! Client-side pagination state for list views.
//!
//! A [`PaginationController`] is the single source of truth for which page a
//! list shows, how big a page is and how many items exist. Every mutator
//! clamps instead of rejecting, so `1 <= page <= total_pages()` holds after
//! each call returns.

use crate::types::{PageMeta, PageQuery};

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Largest `per_page` the POS server honours. Bigger requests fall back to
/// the server default, which would desync the local page math.
pub const MAX_PAGE_SIZE: usize = 100;

/// Bring a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(size: usize) -> usize {
    size.clamp(1, MAX_PAGE_SIZE)
}

/// Number of pages needed for `total` items. Never less than one, so an
/// empty result set still renders as "page 1 of 1".
pub fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1)).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationController {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Default for PaginationController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE, 0)
    }
}

impl PaginationController {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let last = total_pages(total, page_size);
        Self {
            page: page.clamp(1, last),
            page_size,
            total,
        }
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self::new(DEFAULT_PAGE, page_size, 0)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total, self.page_size)
    }

    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// Jump to `page`, clamped into `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: i64) {
        let last = self.total_pages();
        self.page = if page < 1 {
            1
        } else {
            usize::try_from(page).map_or(last, |p| p.min(last))
        };
    }

    pub fn go_to_next_page(&mut self) {
        if self.has_next_page() {
            self.page += 1;
        }
    }

    pub fn go_to_previous_page(&mut self) {
        if self.has_previous_page() {
            self.page -= 1;
        }
    }

    pub fn go_to_first_page(&mut self) {
        self.page = 1;
    }

    pub fn go_to_last_page(&mut self) {
        self.page = self.total_pages();
    }

    /// Replace the page size. Always resets to the first page since the old
    /// page's item window no longer exists.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Replace the total item count. A page beyond the new last page snaps
    /// down to the last page.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        let last = self.total_pages();
        if self.page > last {
            self.page = last;
        }
    }

    /// Apply the metadata of a list response. Only the total is taken from
    /// the server; local navigation stays authoritative for page and size.
    pub fn sync_meta(&mut self, meta: &PageMeta) {
        self.set_total(meta.total);
    }

    /// Zero-based index of the first item on the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// One-based `(first, last)` item numbers shown on the current page,
    /// `(0, 0)` for an empty list.
    pub fn item_range(&self) -> (usize, usize) {
        let start = self.offset().saturating_add(1).min(self.total);
        let end = self.page.saturating_mul(self.page_size).min(self.total);
        (start, end)
    }

    pub fn query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            per_page: self.page_size,
        }
    }
}

/// Ordered set of page sizes a list lets the user pick from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSizeOptions {
    sizes: Vec<usize>,
}

impl Default for PageSizeOptions {
    fn default() -> Self {
        Self::new(vec![5, 10, 20, 50])
    }
}

impl PageSizeOptions {
    /// Zero sizes are dropped, oversized ones capped at [`MAX_PAGE_SIZE`],
    /// the rest sorted and deduplicated. An empty result falls back to the
    /// default options.
    pub fn new(mut sizes: Vec<usize>) -> Self {
        sizes.retain(|&s| s > 0);
        for size in &mut sizes {
            *size = clamp_page_size(*size);
        }
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            return Self::default();
        }
        Self { sizes }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.sizes
    }

    /// Smallest option strictly larger than `current`, or the largest option.
    pub fn next_after(&self, current: usize) -> usize {
        self.sizes
            .iter()
            .copied()
            .find(|&s| s > current)
            .unwrap_or_else(|| self.sizes[self.sizes.len() - 1])
    }

    /// Largest option strictly smaller than `current`, or the smallest option.
    pub fn prev_before(&self, current: usize) -> usize {
        self.sizes
            .iter()
            .rev()
            .copied()
            .find(|&s| s < current)
            .unwrap_or(self.sizes[0])
    }
}
