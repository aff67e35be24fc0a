//! Schema introspection through `information_schema`.

use crate::{FilterRule, FilterSpec};
use serde_json::Value as JsonValue;
use tabula_core::{ColumnDescriptor, Dialect, Row, TableConfig};
use tabula_error::{SchemaError, SchemaErrorKind};
use tabula_interface::{Catalog, CatalogColumn, StatementExecutor};
use tracing::{debug, error, instrument};

const MYSQL_COLUMNS: &str = "SELECT COLUMN_NAME AS column_name, COLUMN_COMMENT AS column_comment, \
     DATA_TYPE AS data_type FROM information_schema.COLUMNS \
     WHERE TABLE_NAME = ? AND TABLE_SCHEMA = COALESCE(NULLIF(?, ''), DATABASE()) \
     ORDER BY ORDINAL_POSITION ASC";

const POSTGRES_COLUMNS: &str = "SELECT c.column_name, \
     col_description(format('%I.%I', c.table_schema, c.table_name)::regclass, c.ordinal_position) AS column_comment, \
     c.data_type FROM information_schema.columns c \
     WHERE c.table_name = ? AND c.table_schema = COALESCE(NULLIF(?, ''), current_schema()) \
     ORDER BY c.ordinal_position ASC";

/// [`Catalog`] backed by `information_schema`, queried through a statement executor.
#[derive(Debug)]
pub struct InformationSchemaCatalog<E> {
    executor: E,
    dialect: Dialect,
}

impl<E> InformationSchemaCatalog<E> {
    /// Catalog querying through `executor` in `dialect`.
    pub fn new(executor: E, dialect: Dialect) -> Self {
        Self { executor, dialect }
    }
}

impl<E: StatementExecutor> Catalog for InformationSchemaCatalog<E> {
    fn query_catalog(&mut self, table: &str, schema: &str) -> Result<Vec<CatalogColumn>, SchemaError> {
        let sql = match self.dialect {
            Dialect::MySql => MYSQL_COLUMNS,
            Dialect::Postgres => POSTGRES_COLUMNS,
        };
        let sql = crate::sql::render(self.dialect, sql);
        let params = [JsonValue::from(table), JsonValue::from(schema)];
        let outcome = self.executor.execute(&sql, &params).map_err(|e| {
            error!(error = %e, table, "Catalog query failed");
            SchemaError::new(SchemaErrorKind::CatalogUnavailable(e.message().to_string()))
        })?;
        Ok(outcome.rows().iter().filter_map(catalog_column).collect())
    }
}

fn field<'a>(row: &'a Row, name: &str) -> Option<&'a JsonValue> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn catalog_column(row: &Row) -> Option<CatalogColumn> {
    let name = field(row, "column_name")?.as_str()?;
    let comment = field(row, "column_comment")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let data_type = field(row, "data_type")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_lowercase();
    Some(CatalogColumn::new(name, comment, data_type))
}

/// Reads column metadata for tables in one schema.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct SchemaIntrospector {
    /// Schema searched; empty means the connection's current schema
    schema_name: String,
}

impl SchemaIntrospector {
    /// Introspector for `schema_name`.
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
        }
    }

    /// Introspector for the configured schema.
    pub fn from_config(config: &TableConfig) -> Self {
        Self::new(config.schema_name().clone())
    }

    /// Columns of `table` in physical order.
    ///
    /// With `with_label`, each label is the column comment, falling back to
    /// the name when the comment is blank; otherwise labels equal names.
    ///
    /// # Errors
    ///
    /// Fails when the catalog is unavailable or has no columns for `table`.
    #[instrument(skip(self, catalog), fields(schema = %self.schema_name))]
    pub fn columns<C: Catalog>(
        &self,
        catalog: &mut C,
        table: &str,
        with_label: bool,
    ) -> Result<Vec<ColumnDescriptor>, SchemaError> {
        let rows = catalog.query_catalog(table, &self.schema_name)?;
        if rows.is_empty() {
            error!("Table not found in catalog");
            return Err(SchemaError::table_not_found(&self.schema_name, table));
        }
        let columns: Vec<_> = rows
            .into_iter()
            .map(|row| {
                let label = match row.column_comment() {
                    Some(comment) if with_label && !comment.trim().is_empty() => comment.clone(),
                    _ => row.column_name().clone(),
                };
                ColumnDescriptor::new(row.column_name().clone(), label, row.data_type().clone())
            })
            .collect();
        debug!(count = columns.len(), "Introspected columns");
        Ok(columns)
    }

    /// Save-form rules derived from the columns: integers for integer types,
    /// text for everything else.
    pub fn filter_spec(columns: &[ColumnDescriptor]) -> FilterSpec {
        columns.iter().fold(FilterSpec::new(), |spec, column| {
            let rule = if column.is_integer() {
                FilterRule::integer()
            } else {
                FilterRule::text()
            };
            spec.rule(column.name().clone(), rule)
        })
    }
}
