//! Pagination window and markup.

use crate::{QueryString, escape_html};
use std::ops::RangeInclusive;
use tabula_core::{NormalizedQueryParams, PagerLabels};
use tracing::instrument;

/// Contiguous run of page numbers shown around the current page.
///
/// An empty window has `end < start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_getters::Getters, derive_new::new)]
pub struct PageWindow {
    /// First page in the window
    start: u64,
    /// Last page in the window
    end: u64,
}

impl PageWindow {
    /// Whether the window contains no pages.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Page numbers in the window.
    pub fn pages(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

/// Number of pages needed for `row_count` rows at `page_size` per page.
pub fn total_pages(row_count: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        0
    } else {
        row_count.div_ceil(page_size)
    }
}

/// Window of at most `window` pages centred on `current`.
///
/// Near either edge the window slides inward so it stays as wide as the
/// page count allows. With no pages the window is empty.
///
/// # Examples
///
/// ```
/// use tabula_database::{compute_window, PageWindow};
///
/// assert_eq!(compute_window(7, 12, 5), PageWindow::new(5, 9));
/// assert_eq!(compute_window(12, 12, 5), PageWindow::new(8, 12));
/// assert_eq!(compute_window(1, 0, 5), PageWindow::new(1, 0));
/// ```
pub fn compute_window(current: u64, total: u64, window: u64) -> PageWindow {
    let window = window.max(1);
    let mut start = current.saturating_sub(window / 2).max(1);
    let end = (start + window - 1).min(total);
    if end + 1 < start + window {
        start = (end + 1).saturating_sub(window).max(1);
    }
    PageWindow::new(start, end)
}

/// Renders pagination markup.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct Paginator<'a> {
    labels: &'a PagerLabels,
    window: u64,
}

impl Paginator<'_> {
    /// Render the pager for `params`' page out of `total` pages.
    ///
    /// The first and last links always render. The previous and next links
    /// only render when there are pages beyond the window on that side. Every
    /// link carries the full navigation state with only the page substituted.
    #[instrument(skip(self, params, base_url), fields(current = params.page_number()))]
    pub fn render(&self, params: &NormalizedQueryParams, total: u64, base_url: &str) -> String {
        let current = params.page_number();
        let window = compute_window(current, total, self.window);
        let href = |page: u64| {
            escape_html(&format!(
                "{}?{}",
                base_url,
                QueryString::serialize(&params.with_page(page))
            ))
        };

        let mut items = String::new();
        items.push_str(&edge_item(&href(1), self.labels.first()));
        if window.start > 1 {
            items.push_str(&link_item(&href(window.start - 1), self.labels.previous()));
        }
        for page in window.pages() {
            if page == current {
                items.push_str(&format!(
                    "<li class=\"page-item active\"><a class=\"page-link\" href=\"#\">{}</a></li>\n",
                    page
                ));
            } else {
                items.push_str(&link_item(&href(page), &page.to_string()));
            }
        }
        if window.end < total {
            items.push_str(&link_item(&href(window.end + 1), self.labels.next()));
        }
        items.push_str(&edge_item(&href(total), self.labels.last()));

        tracing::trace!(start = window.start, end = window.end, total, "Rendered pager");
        format!("<ul class=\"pagination\">\n{}</ul>", items)
    }
}

fn link_item(href: &str, text: &str) -> String {
    format!(
        "<li class=\"page-item\"><a class=\"page-link\" href=\"{}\">{}</a></li>\n",
        href,
        escape_html(text)
    )
}

fn edge_item(href: &str, label: &str) -> String {
    let label = escape_html(label);
    format!(
        "<li class=\"page-item\"><a class=\"page-link\" href=\"{}\"><span aria-hidden=\"true\">{}</span><span class=\"sr-only\">{}</span></a></li>\n",
        href, label, label
    )
}
