//! Trait definitions for the Tabula table query library.
//!
//! The query engine talks to the outside world only through these seams:
//!
//! - [`StatementExecutor`] runs a prepared statement with positional values.
//! - [`Catalog`] reports the columns of a table.
//! - [`RequestParams`] exposes raw request parameters.
//! - [`Presenter`] receives the list and row payloads.
//! - [`Entity`] declares a table binding and its writable attributes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod entity;
mod executor;
mod presenter;
mod request;

pub use catalog::{Catalog, CatalogColumn};
pub use entity::{Entity, derive_table_name};
pub use executor::StatementExecutor;
pub use presenter::{JsonPresenter, Presenter};
pub use request::{RawParams, RequestParams};
