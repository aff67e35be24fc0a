//! Tabula: a generic single-table query engine.
//!
//! Validates navigation input, assembles count/list/lookup/insert/update/delete
//! statements against one table, and renders the pagination and column-sort
//! links that keep the next request consistent with the current one.
//!
//! This crate re-exports the workspace:
//!
//! - [`tabula_error`] - location-tracked error types
//! - [`tabula_core`] - plain data: parameters, rows, pages, configuration
//! - [`tabula_interface`] - executor, catalog, entity and presenter seams
//! - [`tabula_database`] - the query engine
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use tabula::{Entity, RawParams, ScriptedExecutor, TableConfig, TableResource};
//!
//! struct Member;
//!
//! impl Entity for Member {
//!     const ATTRIBUTES: &'static [&'static str] = &["name"];
//! }
//!
//! let executor = ScriptedExecutor::new()
//!     .with_columns(&[("id", None, "int"), ("name", Some("Name"), "varchar")])
//!     .on("COUNT(*)", ScriptedExecutor::rows(json!([{"cnt": 1}])));
//! let config = TableConfig::default();
//! let request = RawParams::parse("sst=name&sod=asc");
//!
//! let mut resource = TableResource::new::<Member>(&config, executor, &request, "/member");
//! let page = resource.list_page().unwrap();
//! assert_eq!(page.heading(), "Member");
//! assert_eq!(page.total_count(), &1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cli;

pub use tabula_core::*;
pub use tabula_database::*;
pub use tabula_error::*;
pub use tabula_interface::*;
