//! Table query engine for Tabula.
//!
//! This crate turns validated request parameters into SQL against a single
//! table and renders the navigation around the results:
//!
//! - [`ParameterFilter`] validates raw input against a [`FilterSpec`]
//! - [`SchemaIntrospector`] reads column metadata through a [`Catalog`](tabula_interface::Catalog)
//! - [`QueryState`] holds the per-request query fragments
//! - [`QueryExecutor`] assembles and runs count, list, lookup, insert, update and delete statements
//! - [`Paginator`] and [`SortLinkBuilder`] render pager and column-sort markup
//! - [`TableResource`] ties them together into list and row views
//!
//! # Features
//!
//! - `database`: PostgreSQL connections and [`PgExecutor`] via diesel

#![warn(missing_docs)]
#![forbid(unsafe_code)]

#[cfg(feature = "database")]
mod connection;
mod executor;
mod filter;
mod pagination;
mod query_state;
mod query_string;
mod resource;
mod schema;
mod scripted;
mod sql;
mod sort_link;

#[cfg(feature = "database")]
pub use connection::{
    PgExecutor, PgPool, PgPooledConnection, create_pool, create_pool_from_url, establish_connection,
};
pub use executor::{QueryExecutor, WhereParams, value_to_string};
pub use filter::{
    EmptyCheck, FilterRule, FilterSpec, FilteredParams, OnInvalid, ParameterFilter, RuleKind,
    strip_tags,
};
pub use pagination::{PageWindow, Paginator, compute_window, total_pages};
pub use query_state::{QueryState, SearchFilter};
pub use query_string::{QueryString, encode_component, escape_html};
pub use resource::{KEY_ACTION, KEY_IDS, LIST_DELETE, TableResource};
pub use schema::{InformationSchemaCatalog, SchemaIntrospector};
pub use scripted::{ExecutedStatement, ScriptedExecutor};
pub use sort_link::{SortLinkBuilder, toggle};
pub use sql::{is_identifier, number_placeholders};
