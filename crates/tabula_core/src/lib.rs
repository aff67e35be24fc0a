//! Core data types for the Tabula table query library.
//!
//! This crate holds the plain data shared by every layer: normalized request
//! parameters, sort directions, column descriptors, rows and execution
//! outcomes, presentation payloads, and the table configuration.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod column;
mod config;
mod observability;
mod outcome;
mod page;
mod param_value;
mod params;
mod sort;

pub use column::ColumnDescriptor;
pub use config::{Dialect, PagerLabels, TableConfig, TableConfigBuilder};
pub use observability::init_tracing;
pub use outcome::{ExecOutcome, ExecResult, Row};
pub use page::{ColumnSortLink, ListPage, Redirect, RowPage};
pub use param_value::ParamValue;
pub use params::{
    DEFAULT_PAGE, DEFAULT_ROWS, KEY_FILTER_COLUMN, KEY_FILTER_TEXT, KEY_PAGE, KEY_ROWS,
    KEY_SORT_COLUMN, KEY_SORT_DIRECTION, MAX_OFFSET, NAVIGATION_KEYS, NormalizedQueryParams,
    NormalizedQueryParamsBuilder,
};
pub use sort::SortDirection;
