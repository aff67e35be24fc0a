//! Presentation payloads and navigation targets.
//!
//! These are the values handed to the view layer. How they are templated is
//! not this crate's concern.

use crate::{ColumnDescriptor, Row};
use serde::{Deserialize, Serialize};

/// Sort anchor for one column header.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_new::new,
)]
pub struct ColumnSortLink {
    /// Column the anchor sorts by
    column: String,
    /// Rendered anchor markup
    anchor: String,
}

/// Payload of a paged list view.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct ListPage {
    /// Page heading
    heading: String,
    /// Rows matching the predicate, across all pages
    total_count: u64,
    /// Rendered pagination markup
    pagination: String,
    /// Rows on the current page
    rows: Vec<Row>,
    /// Sort anchors in column order
    column_links: Vec<ColumnSortLink>,
    /// Hidden inputs preserving the navigation state in forms
    hidden_fields: String,
}

/// Payload of a single-row view.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new,
)]
pub struct RowPage {
    /// Page heading
    heading: String,
    /// The row, if the key matched
    row: Option<Row>,
    /// Hidden inputs preserving the navigation state in forms
    hidden_fields: String,
    /// Table columns in physical order
    columns: Vec<ColumnDescriptor>,
}

/// Where the caller should send the client next.
///
/// The core never performs the redirect; it only computes the target.
///
/// # Examples
///
/// ```
/// use tabula_core::Redirect;
///
/// let target = Redirect::new("/member", "&rows=20&page=2");
/// assert_eq!(target.to_string(), "/member?&rows=20&page=2");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_new::new,
    derive_more::Display,
)]
#[display("{}?{}", path, query)]
pub struct Redirect {
    /// Target path
    #[new(into)]
    path: String,
    /// Serialized navigation query string
    #[new(into)]
    query: String,
}
