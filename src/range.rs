//! Compressed page-number strips: `1 ... 4 5 [6] 7 8 ... 20`.

use std::fmt;

pub const DEFAULT_DELTA: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl PageItem {
    pub fn page(&self) -> Option<usize> {
        match self {
            PageItem::Page(n) => Some(*n),
            PageItem::Ellipsis => None,
        }
    }
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(n) => write!(f, "{}", n),
            PageItem::Ellipsis => write!(f, "..."),
        }
    }
}

/// Build the page strip around `current`.
///
/// The window `current - delta ..= current + delta` (bounded by the page
/// count) is always listed in full. Page 1 and the last page are added when
/// the window does not reach them, with an ellipsis in between whenever at
/// least one page is skipped.
pub fn compress(current: usize, total_pages: usize, delta: usize) -> Vec<PageItem> {
    let total_pages = total_pages.max(1);
    let current = current.clamp(1, total_pages);

    let start = current.saturating_sub(delta).max(1);
    let end = current.saturating_add(delta).min(total_pages);

    let mut items = Vec::with_capacity(end - start + 5);

    if start > 2 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
    } else if start == 2 {
        items.push(PageItem::Page(1));
    }

    items.extend((start..=end).map(PageItem::Page));

    if end < total_pages - 1 {
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total_pages));
    } else if end == total_pages - 1 {
        items.push(PageItem::Page(total_pages));
    }

    items
}

pub fn compress_default(current: usize, total_pages: usize) -> Vec<PageItem> {
    compress(current, total_pages, DEFAULT_DELTA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    fn pages(ns: &[usize]) -> Vec<PageItem> {
        ns.iter().map(|&n| Page(n)).collect()
    }

    #[test]
    fn single_page() {
        assert_eq!(compress(1, 1, 2), vec![Page(1)]);
    }

    #[test]
    fn middle_has_both_ellipses() {
        assert_eq!(
            compress(5, 10, 2),
            vec![
                Page(1),
                Ellipsis,
                Page(3),
                Page(4),
                Page(5),
                Page(6),
                Page(7),
                Ellipsis,
                Page(10)
            ]
        );
    }

    #[test]
    fn first_page_has_trailing_ellipsis_only() {
        assert_eq!(
            compress(1, 10, 2),
            vec![Page(1), Page(2), Page(3), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn window_touching_both_ends() {
        assert_eq!(compress(2, 3, 2), pages(&[1, 2, 3]));
    }

    #[test]
    fn adjacent_boundary_pages_skip_ellipsis() {
        // window 2..=6, so page 1 and page 7 attach directly
        assert_eq!(compress(4, 7, 2), pages(&[1, 2, 3, 4, 5, 6, 7]));
    }

    #[test]
    fn last_page() {
        assert_eq!(
            compress(10, 10, 2),
            vec![Page(1), Ellipsis, Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn zero_delta() {
        assert_eq!(
            compress(5, 9, 0),
            vec![Page(1), Ellipsis, Page(5), Ellipsis, Page(9)]
        );
    }

    #[test]
    fn out_of_range_current_is_clamped() {
        assert_eq!(compress(0, 0, 2), pages(&[1]));
        assert_eq!(compress(99, 4, 1), vec![Page(1), Ellipsis, Page(3), Page(4)]);
    }

    #[test]
    fn invariants_hold_across_inputs() {
        for total in 1..30 {
            for current in 1..=total {
                for delta in 0..4 {
                    let items = compress(current, total, delta);
                    assert!(items.len() <= 2 * delta + 1 + 4);
                    assert!(items.contains(&Page(current)));
                    assert_eq!(items.first(), Some(&Page(1)));
                    assert_eq!(items.last(), Some(&Page(total)));

                    let numbers: Vec<usize> = items.iter().filter_map(PageItem::page).collect();
                    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
                    assert!(items
                        .windows(2)
                        .all(|w| !(w[0] == Ellipsis && w[1] == Ellipsis)));
                }
            }
        }
    }

    #[test]
    fn display_labels() {
        let labels: Vec<String> = compress(5, 10, 1).iter().map(|i| i.to_string()).collect();
        assert_eq!(labels, ["1", "...", "4", "5", "6", "...", "10"]);
    }
}
