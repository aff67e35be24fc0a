//! Schema catalog seam.

use serde::{Deserialize, Serialize};
use tabula_error::SchemaError;

/// One column row from the catalog.
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
pub struct CatalogColumn {
    /// Column name
    #[new(into)]
    column_name: String,
    /// Column comment, if one was recorded
    column_comment: Option<String>,
    /// Data type as the catalog spells it
    #[new(into)]
    data_type: String,
}

/// Source of table metadata.
pub trait Catalog {
    /// Columns of `table` in `schema`, in physical (ordinal) order.
    ///
    /// An unknown table yields an empty list; deciding that this is fatal is
    /// left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] when the catalog cannot be queried.
    fn query_catalog(&mut self, table: &str, schema: &str) -> Result<Vec<CatalogColumn>, SchemaError>;
}

impl<T> Catalog for &mut T
where
    T: Catalog + ?Sized,
{
    fn query_catalog(&mut self, table: &str, schema: &str) -> Result<Vec<CatalogColumn>, SchemaError> {
        (**self).query_catalog(table, schema)
    }
}
