//! Request-scoped list and row views over one table.

use crate::{
    FilterRule, FilterSpec, InformationSchemaCatalog, ParameterFilter, Paginator, QueryExecutor,
    QueryState, QueryString, SchemaIntrospector, SortLinkBuilder, encode_component, total_pages,
    value_to_string,
};
use serde_json::Value as JsonValue;
use tabula_core::{
    ColumnDescriptor, ListPage, NormalizedQueryParams, Redirect, RowPage, TableConfig,
};
use tabula_error::TabulaResult;
use tabula_interface::{Entity, Presenter, RequestParams, StatementExecutor};
use tracing::{debug, info, instrument};

/// List action that deletes the selected rows.
pub const LIST_DELETE: &str = "list-delete";
/// Form key naming the list action.
pub const KEY_ACTION: &str = "req";
/// Form key carrying the selected row ids.
pub const KEY_IDS: &str = "ids";

/// One table bound to one request.
///
/// Owns the request's [`QueryState`] and normalized navigation parameters;
/// the column list is read from the catalog once and reused for the rest of
/// the request.
#[derive(Debug)]
pub struct TableResource<'a, E> {
    config: &'a TableConfig,
    executor: QueryExecutor<E>,
    state: QueryState,
    params: NormalizedQueryParams,
    base_url: String,
    namespace: String,
    heading: String,
    columns: Option<Vec<ColumnDescriptor>>,
}

impl<'a, E: StatementExecutor> TableResource<'a, E> {
    /// Resource for entity `T`, with navigation read from `request`.
    pub fn new<T: Entity>(
        config: &'a TableConfig,
        executor: E,
        request: &impl RequestParams,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            config,
            executor: QueryExecutor::new(executor, config),
            state: QueryState::for_entity::<T>(*config.dialect()),
            params: ParameterFilter::normalize(request, *config.rows_per_page()),
            base_url: base_url.into(),
            namespace: T::namespace(),
            heading: T::heading(),
            columns: None,
        }
    }

    /// Read-only resource for a table named at runtime.
    ///
    /// No columns are writable until an attribute allow-list is set on the
    /// [`state_mut`](Self::state_mut).
    pub fn for_table(
        config: &'a TableConfig,
        executor: E,
        table: &str,
        request: &impl RequestParams,
        base_url: impl Into<String>,
    ) -> Self {
        let mut chars = table.chars();
        let heading = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self {
            config,
            executor: QueryExecutor::new(executor, config),
            state: QueryState::new(table, *config.dialect()),
            params: ParameterFilter::normalize(request, *config.rows_per_page()),
            base_url: base_url.into(),
            namespace: table.to_lowercase(),
            heading,
            columns: None,
        }
    }

    /// Page heading.
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Normalized navigation parameters of this request.
    pub fn params(&self) -> &NormalizedQueryParams {
        &self.params
    }

    /// Query fragments.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Query fragments, for customizing projection, predicate and clauses.
    pub fn state_mut(&mut self) -> &mut QueryState {
        &mut self.state
    }

    /// Statement layer.
    pub fn executor_mut(&mut self) -> &mut QueryExecutor<E> {
        &mut self.executor
    }

    /// Serialized navigation state.
    pub fn query_string(&self) -> String {
        QueryString::serialize(&self.params)
    }

    /// Columns of the bound table with labels, read once per resource.
    pub fn columns(&mut self) -> TabulaResult<&[ColumnDescriptor]> {
        if self.columns.is_none() {
            let dialect = self.executor.dialect();
            let mut catalog = InformationSchemaCatalog::new(self.executor.inner_mut(), dialect);
            let columns = SchemaIntrospector::from_config(self.config).columns(
                &mut catalog,
                self.state.table(),
                true,
            )?;
            self.state.set_column_types(&columns);
            self.columns = Some(columns);
        }
        Ok(self.columns.as_deref().unwrap_or_default())
    }

    /// Paged list with pagination, sort anchors and hidden fields.
    #[instrument(skip(self), fields(table = %self.state.table(), page = self.params.page_number()))]
    pub fn list_page(&mut self) -> TabulaResult<ListPage> {
        let columns = self.columns()?.to_vec();
        self.state.apply_navigation(&self.params, &columns);

        let total_count = self.executor.row_count(&mut self.state)?;
        let pages = total_pages(total_count, self.params.page_size());
        let pagination = Paginator::new(self.config.labels(), *self.config.page_window())
            .render(&self.params, pages, &self.base_url);
        let rows = self.executor.list(&self.state, &self.params)?;
        let column_links =
            SortLinkBuilder::new(&self.params, &self.base_url).column_links(&columns);

        debug!(total_count, rows = rows.len(), "Built list page");
        Ok(ListPage::new(
            self.heading.clone(),
            total_count,
            pagination,
            rows,
            column_links,
            QueryString::hidden_fields(&self.params),
        ))
    }

    /// Single row looked up by primary key; a miss yields an empty row.
    #[instrument(skip(self, id), fields(table = %self.state.table()))]
    pub fn row_page(&mut self, id: impl Into<JsonValue>) -> TabulaResult<RowPage> {
        let columns = self.columns()?.to_vec();
        let row = self
            .executor
            .get_by_key(&self.state, self.config.primary_key(), id)?;
        Ok(RowPage::new(
            self.heading.clone(),
            row,
            QueryString::hidden_fields(&self.params),
            columns,
        ))
    }

    /// Insert or update a row from form input and point at its row view.
    ///
    /// Input is validated against rules derived from the table's columns. A
    /// non-blank primary key updates that row; otherwise a row is inserted.
    #[instrument(skip(self, form), fields(table = %self.state.table()))]
    pub fn save_row(&mut self, form: &impl RequestParams) -> TabulaResult<Redirect> {
        let columns = self.columns()?.to_vec();
        let mut fields = ParameterFilter::validate(form, &SchemaIntrospector::filter_spec(&columns));
        let key = self.config.primary_key().clone();
        let id = fields
            .remove(&key)
            .filter(|value| !value_to_string(value).trim().is_empty());

        let id = match id {
            Some(id) => {
                let clause = format!("{} = ?", key);
                self.executor
                    .update(&self.state, fields, &clause, id.clone())?;
                info!(id = %id, "Updated row");
                value_to_string(&id)
            }
            None => {
                let result = self.executor.insert(&self.state, fields)?;
                self.state.invalidate_count();
                let id = result.last_insert_id().clone().unwrap_or_default();
                info!(id = %id, "Inserted row");
                id
            }
        };

        Ok(Redirect::new(
            format!("/{}/row/{}", self.namespace, encode_component(&id)),
            self.query_string(),
        ))
    }

    /// Run a bulk action from the list view and point back at the list.
    ///
    /// Only [`LIST_DELETE`] does anything; other actions are ignored.
    #[instrument(skip(self, form), fields(table = %self.state.table()))]
    pub fn apply_list_action(&mut self, form: &impl RequestParams) -> TabulaResult<Redirect> {
        let spec = FilterSpec::new()
            .rule(KEY_ACTION, FilterRule::text())
            .rule(KEY_IDS, FilterRule::integer().with_min(1).with_force_array(true));
        let input = ParameterFilter::validate(form, &spec);

        match input.get_str(KEY_ACTION) {
            Some(LIST_DELETE) => {
                let ids = input.get_list(KEY_IDS);
                let key = self.config.primary_key().clone();
                let result = self.executor.delete_by_keys(&self.state, &key, &ids)?;
                self.state.invalidate_count();
                info!(deleted = result.rows_affected(), "Deleted rows");
            }
            Some(action) => debug!(action, "Ignoring list action"),
            None => debug!("No list action"),
        }

        Ok(Redirect::new(format!("/{}", self.namespace), self.query_string()))
    }

    /// Build the list page and hand it to `presenter`.
    pub fn present_list<P: Presenter>(&mut self, presenter: &P) -> TabulaResult<P::Output> {
        let page = self.list_page()?;
        Ok(presenter.present_list(&page))
    }

    /// Build the row page for `id` and hand it to `presenter`.
    pub fn present_row<P: Presenter>(
        &mut self,
        presenter: &P,
        id: impl Into<JsonValue>,
    ) -> TabulaResult<P::Output> {
        let page = self.row_page(id)?;
        Ok(presenter.present_row(&page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedExecutor;
    use serde_json::json;
    use tabula_core::Dialect;
    use tabula_interface::RawParams;

    struct Member;

    impl Entity for Member {
        const ATTRIBUTES: &'static [&'static str] = &["name", "level"];
    }

    fn scripted() -> ScriptedExecutor {
        ScriptedExecutor::new()
            .with_columns(&[
                ("id", Some("No."), "int"),
                ("name", Some("Name"), "varchar"),
                ("level", None, "int"),
            ])
            .on("COUNT(*)", ScriptedExecutor::rows(json!([{"cnt": 45}])))
            .on(
                "SELECT * FROM member",
                ScriptedExecutor::rows(json!([{"id": 1, "name": "Kim", "level": 3}])),
            )
    }

    #[test]
    fn test_columns_are_read_once() {
        let config = TableConfig::default();
        let mut resource =
            TableResource::new::<Member>(&config, scripted(), &RawParams::new(), "/member");
        resource.columns().unwrap();
        resource.columns().unwrap();
        resource.row_page(1).unwrap();
        assert_eq!(
            resource
                .executor_mut()
                .inner_mut()
                .matching("information_schema")
                .len(),
            1
        );
    }

    #[test]
    fn test_list_page_counts_once() {
        let config = TableConfig::default();
        let request = RawParams::parse("page=2&rows=10");
        let mut resource = TableResource::new::<Member>(&config, scripted(), &request, "/member");
        let page = resource.list_page().unwrap();
        assert_eq!(page.total_count(), &45);
        assert_eq!(page.rows().len(), 1);
        assert_eq!(page.column_links().len(), 3);
        assert!(page.pagination().contains("href=\"#\">2</a>"));
        assert!(page.hidden_fields().contains("name=\"page\" value=\"2\""));
        let inner = resource.executor_mut().inner_mut();
        assert_eq!(inner.matching("COUNT(*)").len(), 1);
        assert!(inner.last().unwrap().sql().ends_with("LIMIT 10 OFFSET 10"));
    }

    #[test]
    fn test_save_row_updates_with_key() {
        let config = TableConfig::default();
        let request = RawParams::parse("page=3");
        let mut resource = TableResource::new::<Member>(&config, scripted(), &request, "/member");
        let form = RawParams::new()
            .with("id", "7")
            .with("name", "<i>Lee</i>")
            .with("level", "x")
            .with("is_admin", "1");
        let target = resource.save_row(&form).unwrap();
        assert_eq!(target.to_string(), "/member/row/7?&rows=20&page=3");
        let statement = resource.executor_mut().inner_mut().last().unwrap().clone();
        assert_eq!(statement.sql(), "UPDATE member SET name = ? WHERE id = ?");
        assert_eq!(statement.params(), &vec![json!("Lee"), json!(7)]);
    }

    #[test]
    fn test_save_row_inserts_without_key() {
        let config = TableConfig::builder().dialect(Dialect::Postgres).build().unwrap();
        let executor = scripted().on("INSERT", ScriptedExecutor::rows(json!([{"id": 88}])));
        let mut resource =
            TableResource::new::<Member>(&config, executor, &RawParams::new(), "/member");
        let form = RawParams::new().with("id", "").with("name", "Park").with("level", "2");
        let target = resource.save_row(&form).unwrap();
        assert_eq!(target.path(), "/member/row/88");
        assert_eq!(
            resource.executor_mut().inner_mut().last().unwrap().sql(),
            "INSERT INTO member (name, level) VALUES ($1, $2) RETURNING id"
        );
    }

    #[test]
    fn test_list_delete_action() {
        let config = TableConfig::default();
        let mut resource =
            TableResource::new::<Member>(&config, scripted(), &RawParams::new(), "/member");
        let form = RawParams::parse("req=list-delete&ids[]=3&ids[]=oops&ids[]=5");
        let target = resource.apply_list_action(&form).unwrap();
        assert_eq!(target.to_string(), "/member?&rows=20&page=1");
        let statement = resource.executor_mut().inner_mut().last().unwrap().clone();
        assert_eq!(statement.sql(), "DELETE FROM member WHERE id IN (?, ?)");
        assert_eq!(statement.params(), &vec![json!(3), json!(5)]);
    }

    #[test]
    fn test_unknown_action_runs_nothing() {
        let config = TableConfig::default();
        let mut resource =
            TableResource::new::<Member>(&config, scripted(), &RawParams::new(), "/member");
        let form = RawParams::parse("req=list-modify&ids[]=3");
        resource.apply_list_action(&form).unwrap();
        assert!(resource.executor_mut().inner_mut().executed().is_empty());
    }

    #[test]
    fn test_for_table_heading() {
        let config = TableConfig::default();
        let resource =
            TableResource::for_table(&config, ScriptedExecutor::new(), "orders", &RawParams::new(), "/orders");
        assert_eq!(resource.heading(), "Orders");
        assert!(resource.state().attributes().is_empty());
    }
}
