//! Pagination window and summary.
//!
//! The window is a fixed, at most five-slot set of page buttons around the
//! current page. Ellipsis tokens jump straight to the first or last page.

use std::fmt;

/// One slot in the pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageToken {
    /// A 0-based page number.
    Page(usize),
    /// Leading ellipsis; jumps to the first page.
    FirstEllipsis,
    /// Trailing ellipsis; jumps to the last page.
    LastEllipsis,
}

impl PageToken {
    /// The page this token navigates to.
    pub fn target(self, page_count: usize) -> usize {
        match self {
            PageToken::Page(index) => index,
            PageToken::FirstEllipsis => 0,
            PageToken::LastEllipsis => page_count.saturating_sub(1),
        }
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Buttons are labelled 1-based
            PageToken::Page(index) => write!(f, "{}", index + 1),
            PageToken::FirstEllipsis | PageToken::LastEllipsis => f.write_str("…"),
        }
    }
}

/// Compute the page buttons to show.
///
/// - up to 3 pages: every page, no ellipses
/// - first page: `0 1 2 …`
/// - last page: `… n-3 n-2 n-1`
/// - otherwise: `… i-1 i i+1 …`
///
/// # Example
///
/// ```
/// use tabula::pagination::{PageToken::*, compute_window};
///
/// assert_eq!(
///     compute_window(5, 10),
///     vec![FirstEllipsis, Page(4), Page(5), Page(6), LastEllipsis]
/// );
/// ```
pub fn compute_window(page_index: usize, page_count: usize) -> Vec<PageToken> {
    if page_count <= 3 {
        return (0..page_count).map(PageToken::Page).collect();
    }

    if page_index == 0 {
        return vec![
            PageToken::Page(0),
            PageToken::Page(1),
            PageToken::Page(2),
            PageToken::LastEllipsis,
        ];
    }

    if page_index >= page_count - 1 {
        return vec![
            PageToken::FirstEllipsis,
            PageToken::Page(page_count - 3),
            PageToken::Page(page_count - 2),
            PageToken::Page(page_count - 1),
        ];
    }

    vec![
        PageToken::FirstEllipsis,
        PageToken::Page(page_index - 1),
        PageToken::Page(page_index),
        PageToken::Page(page_index + 1),
        PageToken::LastEllipsis,
    ]
}

/// Number of pages needed for `total` rows. Zero rows means zero pages.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Clamp a page index to the last page that has rows (0 when empty).
pub fn clamp_page_index(page_index: usize, page_size: usize, total: usize) -> usize {
    page_index.min(page_count(total, page_size).saturating_sub(1))
}

/// Footer text: `"{start} - {end} of {total}"`, or `"{total} of {total}"`
/// when there is at most one row.
pub fn summary(page_index: usize, page_size: usize, total: usize) -> String {
    if total <= 1 {
        return format!("{} of {}", total, total);
    }
    let page_index = clamp_page_index(page_index, page_size, total);
    let start = page_index * page_size + 1;
    let end = (start + page_size - 1).min(total);
    format!("{} - {} of {}", start, end, total)
}
