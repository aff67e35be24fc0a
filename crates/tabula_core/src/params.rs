//! Normalized navigation parameters.

use crate::SortDirection;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Query-string key of the free-text search column.
pub const KEY_FILTER_COLUMN: &str = "sfl";
/// Query-string key of the free-text search needle.
pub const KEY_FILTER_TEXT: &str = "stx";
/// Query-string key of the sort column.
pub const KEY_SORT_COLUMN: &str = "sst";
/// Query-string key of the sort direction.
pub const KEY_SORT_DIRECTION: &str = "sod";
/// Query-string key of the page size.
pub const KEY_ROWS: &str = "rows";
/// Query-string key of the page number.
pub const KEY_PAGE: &str = "page";

/// Navigation keys in wire order.
pub const NAVIGATION_KEYS: [&str; 6] = [
    KEY_FILTER_COLUMN,
    KEY_FILTER_TEXT,
    KEY_SORT_COLUMN,
    KEY_SORT_DIRECTION,
    KEY_ROWS,
    KEY_PAGE,
];

/// Rows per page when the request does not say otherwise.
pub const DEFAULT_ROWS: u64 = 20;
/// Page shown when the request does not say otherwise.
pub const DEFAULT_PAGE: u64 = 1;
/// Largest row offset a statement is given; both dialects accept a signed 64-bit offset.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Validated, defaulted request inputs governing filtering, sorting and paging.
///
/// Built once per request from the raw parameters and never mutated; links
/// that need a different page or sort order are rendered from substituted
/// copies (see [`with_page`](Self::with_page) and [`with_sort`](Self::with_sort)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, derive_new::new)]
#[builder(setter(into, strip_option), default)]
pub struct NormalizedQueryParams {
    /// Free-text search column (`sfl`)
    filter_column: Option<String>,
    /// Free-text search needle (`stx`)
    filter_text: Option<String>,
    /// Sort column (`sst`)
    sort_column: Option<String>,
    /// Sort direction (`sod`)
    sort_direction: Option<SortDirection>,
    /// Rows per page (`rows`)
    page_size: u64,
    /// One-based page number (`page`)
    page_number: u64,
}

impl Default for NormalizedQueryParams {
    fn default() -> Self {
        Self {
            filter_column: None,
            filter_text: None,
            sort_column: None,
            sort_direction: None,
            page_size: DEFAULT_ROWS,
            page_number: DEFAULT_PAGE,
        }
    }
}

impl NormalizedQueryParams {
    /// Create a new builder.
    pub fn builder() -> NormalizedQueryParamsBuilder {
        NormalizedQueryParamsBuilder::default()
    }

    /// Free-text search column.
    pub fn filter_column(&self) -> Option<&str> {
        self.filter_column.as_deref()
    }

    /// Free-text search needle.
    pub fn filter_text(&self) -> Option<&str> {
        self.filter_text.as_deref()
    }

    /// Sort column.
    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    /// Sort direction.
    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort_direction
    }

    /// Rows per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// One-based page number.
    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    /// Row offset of the current page, capped at [`MAX_OFFSET`].
    pub fn offset(&self) -> u64 {
        self.page_number
            .saturating_sub(1)
            .checked_mul(self.page_size)
            .map_or(MAX_OFFSET, |offset| offset.min(MAX_OFFSET))
    }

    /// Copy with the page number replaced.
    pub fn with_page(&self, page_number: u64) -> Self {
        Self {
            page_number,
            ..self.clone()
        }
    }

    /// Copy with the sort column and direction replaced.
    pub fn with_sort(&self, column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            sort_column: Some(column.into()),
            sort_direction: Some(direction),
            ..self.clone()
        }
    }

    /// Non-empty values as `(key, value)` pairs in wire order.
    ///
    /// Empty strings count as absent, so a blank `stx=` never reaches a link.
    /// `rows` and `page` are always present, even when zero.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(NAVIGATION_KEYS.len());
        let text = [
            (KEY_FILTER_COLUMN, self.filter_column.as_deref()),
            (KEY_FILTER_TEXT, self.filter_text.as_deref()),
            (KEY_SORT_COLUMN, self.sort_column.as_deref()),
        ];
        for (key, value) in text {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }
        if let Some(direction) = self.sort_direction {
            pairs.push((KEY_SORT_DIRECTION, direction.to_string()));
        }
        pairs.push((KEY_ROWS, self.page_size.to_string()));
        pairs.push((KEY_PAGE, self.page_number.to_string()));
        pairs
    }
}
