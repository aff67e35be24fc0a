//! Per-request query fragments.

use crate::sql::escape_like;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tabula_core::{ColumnDescriptor, Dialect, NormalizedQueryParams, SortDirection};
use tabula_interface::Entity;
use tracing::debug;

/// Free-text search applied on top of the base predicate.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_new::new)]
pub struct SearchFilter {
    /// Searched column
    #[new(into)]
    column: String,
    /// Text the column must contain
    #[new(into)]
    needle: String,
}

/// Mutable query fragments owned by one request-scoped unit of work.
///
/// Fragments are raw SQL supplied by the embedding code: `select_list`
/// without `SELECT`, the base predicate without `WHERE`, and the group, order
/// and limit clauses with their keywords. Navigation input never lands in a
/// fragment directly; search and sort columns are checked against the schema
/// and the search needle is bound.
///
/// # Examples
///
/// ```
/// use tabula_core::Dialect;
/// use tabula_database::QueryState;
///
/// let state = QueryState::new("member", Dialect::Postgres);
/// assert_eq!(state.table(), "member");
/// assert_eq!(state.select_list(), "*");
/// assert_eq!(state.base_predicate(), "(1 = 1)");
/// assert!(state.cached_row_count().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct QueryState {
    /// Table the statements run against
    table: String,
    /// Projection
    select_list: String,
    /// Predicate without the `WHERE` keyword
    base_predicate: String,
    /// Values bound to the predicate's placeholders
    predicate_params: Vec<JsonValue>,
    /// `GROUP BY ...`, or empty
    group_clause: String,
    /// `ORDER BY ...`, or empty to fall back to the navigation sort
    order_clause: String,
    /// `LIMIT ...`, or empty to page by the navigation state
    limit_clause: String,
    /// Validated free-text search
    search: Option<SearchFilter>,
    /// Validated navigation sort
    sort: Option<(String, SortDirection)>,
    /// Row count memoized for this request
    cached_row_count: Option<u64>,
    /// Columns inserts and updates may write
    #[getter(skip)]
    attributes: &'static [&'static str],
    /// Catalog data type per column, for typed placeholders
    column_types: BTreeMap<String, String>,
    /// Dialect the fragments are written for
    dialect: Dialect,
}

impl QueryState {
    /// Fresh state selecting everything from `table`.
    pub fn new(table: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            table: table.into(),
            select_list: "*".to_string(),
            base_predicate: dialect.tautology().to_string(),
            predicate_params: Vec::new(),
            group_clause: String::new(),
            order_clause: String::new(),
            limit_clause: String::new(),
            search: None,
            sort: None,
            cached_row_count: None,
            attributes: &[],
            column_types: BTreeMap::new(),
            dialect,
        }
    }

    /// Columns inserts and updates may write.
    pub fn attributes(&self) -> &'static [&'static str] {
        self.attributes
    }

    /// Fresh state bound to an entity's table and attribute allow-list.
    pub fn for_entity<E: Entity>(dialect: Dialect) -> Self {
        let mut state = Self::new(E::table_name(), dialect);
        state.attributes = E::ATTRIBUTES;
        state
    }

    /// Replace the projection.
    pub fn set_select(&mut self, select_list: impl Into<String>) -> &mut Self {
        self.select_list = select_list.into();
        self
    }

    /// Replace the base predicate and its bound values.
    ///
    /// The cached row count is kept; call
    /// [`invalidate_count`](Self::invalidate_count) when the new predicate
    /// changes which rows match.
    pub fn set_predicate(
        &mut self,
        predicate: impl Into<String>,
        params: impl IntoIterator<Item = JsonValue>,
    ) -> &mut Self {
        self.base_predicate = predicate.into();
        self.predicate_params = params.into_iter().collect();
        self
    }

    /// Replace the `GROUP BY` clause.
    pub fn set_group(&mut self, clause: impl Into<String>) -> &mut Self {
        self.group_clause = clause.into();
        self
    }

    /// Replace the `ORDER BY` clause; it takes precedence over the navigation sort.
    pub fn set_order(&mut self, clause: impl Into<String>) -> &mut Self {
        self.order_clause = clause.into();
        self
    }

    /// Replace the `LIMIT` clause; it takes precedence over paging.
    pub fn set_limit(&mut self, clause: impl Into<String>) -> &mut Self {
        self.limit_clause = clause.into();
        self
    }

    /// Replace the attribute allow-list.
    pub fn set_attributes(&mut self, attributes: &'static [&'static str]) -> &mut Self {
        self.attributes = attributes;
        self
    }

    /// Record the catalog data type of each column.
    ///
    /// Inserts and updates use them to type their placeholders.
    pub fn set_column_types(&mut self, columns: &[ColumnDescriptor]) -> &mut Self {
        self.column_types = columns
            .iter()
            .map(|c| (c.name().clone(), c.data_type().clone()))
            .collect();
        self
    }

    /// Catalog data type of `column`, if known.
    pub fn column_type(&self, column: &str) -> Option<&str> {
        self.column_types.get(column).map(String::as_str)
    }

    /// Forget the memoized row count.
    pub fn invalidate_count(&mut self) -> &mut Self {
        self.cached_row_count = None;
        self
    }

    pub(crate) fn record_count(&mut self, count: u64) {
        self.cached_row_count = Some(count);
    }

    /// Adopt the search and sort from the navigation state.
    ///
    /// A search or sort column that is not one of `columns` is ignored. A
    /// change of search invalidates the cached count.
    pub fn apply_navigation(
        &mut self,
        params: &NormalizedQueryParams,
        columns: &[ColumnDescriptor],
    ) -> &mut Self {
        let known = |name: &str| columns.iter().any(|c| c.name() == name);

        let search = match (params.filter_column(), params.filter_text()) {
            (Some(column), Some(needle)) if known(column) => {
                Some(SearchFilter::new(column, needle))
            }
            (Some(column), Some(_)) => {
                debug!(column, "Ignoring search on unknown column");
                None
            }
            _ => None,
        };
        if search != self.search {
            self.search = search;
            self.cached_row_count = None;
        }

        self.sort = match params.sort_column() {
            Some(column) if known(column) => Some((
                column.to_string(),
                params.sort_direction().unwrap_or_default(),
            )),
            Some(column) => {
                debug!(column, "Ignoring sort on unknown column");
                None
            }
            None => None,
        };
        self
    }

    /// Predicate text and its bound values, including the search.
    ///
    /// PostgreSQL has no `LIKE` for non-text types, so there the searched
    /// column is cast to text first.
    pub fn where_sql(&self) -> (String, Vec<JsonValue>) {
        let mut params = self.predicate_params.clone();
        let mut predicate = self.base_predicate.clone();
        if let Some(search) = &self.search {
            let column = match self.dialect {
                Dialect::MySql => search.column.clone(),
                Dialect::Postgres => format!("CAST({} AS TEXT)", search.column),
            };
            predicate.push_str(&format!(" AND ({} LIKE ?)", column));
            params.push(JsonValue::String(format!("%{}%", escape_like(&search.needle))));
        }
        (predicate, params)
    }

    /// Order clause in effect: the explicit one, else the navigation sort.
    pub fn order_sql(&self) -> String {
        if !self.order_clause.is_empty() {
            return self.order_clause.clone();
        }
        match &self.sort {
            Some((column, direction)) => {
                format!("ORDER BY {} {}", column, direction)
            }
            None => String::new(),
        }
    }
}
