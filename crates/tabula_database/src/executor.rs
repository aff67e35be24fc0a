//! Statement assembly and execution.

use crate::QueryState;
use crate::sql::{self, ensure_identifier, pg_cast, placeholders};
use serde_json::Value as JsonValue;
use tabula_core::{Dialect, ExecOutcome, ExecResult, NormalizedQueryParams, Row, TableConfig};
use tabula_error::{ExecutionError, QueryError, QueryErrorKind, QueryOperation};
use tabula_interface::StatementExecutor;
use tracing::{debug, error, instrument, warn};

/// Values bound to the placeholders of a caller-supplied `WHERE` clause.
#[derive(Debug, Clone, PartialEq, Default, derive_more::From)]
pub enum WhereParams {
    /// The clause has no placeholders
    #[default]
    None,
    /// One placeholder
    Single(JsonValue),
    /// One value per placeholder, in order
    Many(Vec<JsonValue>),
}

impl WhereParams {
    fn into_vec(self) -> Vec<JsonValue> {
        match self {
            WhereParams::None => Vec::new(),
            WhereParams::Single(value) => vec![value],
            WhereParams::Many(values) => values,
        }
    }
}

/// Render a scalar column value as plain text.
pub fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Turns a [`QueryState`] into statements and runs them.
///
/// Statement text is assembled with `?` placeholders and renumbered for the
/// configured dialect. Only fragment text is interpolated; values are always
/// bound.
#[derive(Debug)]
pub struct QueryExecutor<E> {
    executor: E,
    dialect: Dialect,
    count_expr: String,
    primary_key: String,
}

impl<E: StatementExecutor> QueryExecutor<E> {
    /// Wrap `executor` with the dialect and count expression from `config`.
    pub fn new(executor: E, config: &TableConfig) -> Self {
        Self {
            executor,
            dialect: *config.dialect(),
            count_expr: config.count_expr().clone(),
            primary_key: config.primary_key().clone(),
        }
    }

    /// Dialect statements are rendered for.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The wrapped statement executor.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Unwrap the statement executor.
    pub fn into_inner(self) -> E {
        self.executor
    }

    fn run(
        &mut self,
        operation: QueryOperation,
        sql: &str,
        params: &[JsonValue],
    ) -> Result<ExecOutcome, QueryError> {
        let sql = sql::render(self.dialect, sql);
        debug!(%operation, sql = %sql, params = params.len(), "Executing statement");
        self.executor.execute(&sql, params).map_err(|e| {
            error!(%operation, error = %e, "Statement failed");
            QueryError::execution(operation, e)
        })
    }

    /// Count rows matching the predicate and search, memoizing the result.
    ///
    /// The group clause is not applied; a grouped count belongs in the
    /// configured count expression.
    #[instrument(skip(self, state), fields(table = %state.table()))]
    pub fn count(&mut self, state: &mut QueryState) -> Result<u64, QueryError> {
        let (predicate, params) = state.where_sql();
        let mut sql = format!(
            "SELECT {} AS cnt FROM {} WHERE {}",
            self.count_expr,
            state.table(),
            predicate
        );

        let outcome = self.run(QueryOperation::Count, &sql, &params)?;
        let count = outcome
            .rows()
            .first()
            .and_then(|row| row.values().next())
            .and_then(json_to_count)
            .ok_or_else(|| {
                error!("Count statement returned no count");
                QueryError::execution(
                    QueryOperation::Count,
                    ExecutionError::new("count statement returned no count"),
                )
            })?;
        state.record_count(count);
        Ok(count)
    }

    /// Memoized row count, counting on first use.
    pub fn row_count(&mut self, state: &mut QueryState) -> Result<u64, QueryError> {
        match state.cached_row_count() {
            Some(count) => Ok(*count),
            None => self.count(state),
        }
    }

    /// Fetch the page of rows selected by `params`.
    ///
    /// An explicit order or limit clause on the state replaces the navigation
    /// sort or the paging respectively.
    #[instrument(skip(self, state, params), fields(table = %state.table(), page = params.page_number()))]
    pub fn list(
        &mut self,
        state: &QueryState,
        params: &NormalizedQueryParams,
    ) -> Result<Vec<Row>, QueryError> {
        let (predicate, bound) = state.where_sql();
        let mut sql = format!(
            "SELECT {} FROM {} WHERE {}",
            state.select_list(),
            state.table(),
            predicate
        );
        push_clause(&mut sql, state.group_clause());
        push_clause(&mut sql, &state.order_sql());
        if state.limit_clause().is_empty() {
            push_clause(
                &mut sql,
                &format!("LIMIT {} OFFSET {}", params.page_size(), params.offset()),
            );
        } else {
            push_clause(&mut sql, state.limit_clause());
        }

        let rows = self.run(QueryOperation::List, &sql, &bound)?.into_rows();
        debug!(count = rows.len(), "Listed rows");
        Ok(rows)
    }

    /// Fetch the first row whose `key` column equals `value`.
    #[instrument(skip(self, state, value), fields(table = %state.table()))]
    pub fn get_by_key(
        &mut self,
        state: &QueryState,
        key: &str,
        value: impl Into<JsonValue>,
    ) -> Result<Option<Row>, QueryError> {
        ensure_identifier(QueryOperation::GetByKey, key)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            state.select_list(),
            state.table(),
            key
        );
        let rows = self
            .run(QueryOperation::GetByKey, &sql, &[value.into()])?
            .into_rows();
        Ok(rows.into_iter().next())
    }

    /// Insert one row from the allowed subset of `data`.
    ///
    /// Keys outside the state's attribute allow-list are dropped.
    #[instrument(skip(self, state, data), fields(table = %state.table()))]
    pub fn insert(
        &mut self,
        state: &QueryState,
        data: impl IntoIterator<Item = (String, JsonValue)>,
    ) -> Result<ExecResult, QueryError> {
        let (columns, values) = allowed(state, data);
        let sql = match self.dialect {
            Dialect::MySql if columns.is_empty() => {
                format!("INSERT INTO {} () VALUES ()", state.table())
            }
            Dialect::MySql => format!(
                "INSERT INTO {} SET {}",
                state.table(),
                self.assignments(state, &columns)
            ),
            Dialect::Postgres if columns.is_empty() => format!(
                "INSERT INTO {} DEFAULT VALUES RETURNING {}",
                state.table(),
                self.primary_key
            ),
            Dialect::Postgres => format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
                state.table(),
                columns.join(", "),
                columns
                    .iter()
                    .map(|c| self.placeholder(state, c))
                    .collect::<Vec<_>>()
                    .join(", "),
                self.primary_key
            ),
        };

        let mut outcome = self.run(QueryOperation::Insert, &sql, &values)?;
        if outcome.last_insert_id().is_none() {
            let returned = outcome
                .rows()
                .first()
                .and_then(|row| row.get(&self.primary_key))
                .map(value_to_string);
            if let Some(id) = returned {
                outcome = outcome.with_last_insert_id(id);
            }
        }
        let result = ExecResult::from(outcome);
        debug!(id = ?result.last_insert_id(), "Inserted row");
        Ok(result)
    }

    /// Update rows matching `where_clause` from the allowed subset of `data`.
    ///
    /// An update with nothing to assign is a no-op.
    ///
    /// # Errors
    ///
    /// Refuses to run with an empty `where_clause`.
    #[instrument(skip(self, state, data, where_params), fields(table = %state.table()))]
    pub fn update(
        &mut self,
        state: &QueryState,
        data: impl IntoIterator<Item = (String, JsonValue)>,
        where_clause: &str,
        where_params: impl Into<WhereParams>,
    ) -> Result<ExecResult, QueryError> {
        ensure_predicate(QueryOperation::Update, where_clause)?;
        let (columns, mut values) = allowed(state, data);
        if columns.is_empty() {
            warn!("Update has no assignable fields, skipping");
            return Ok(ExecResult::default());
        }
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            state.table(),
            self.assignments(state, &columns),
            where_clause
        );
        values.extend(where_params.into().into_vec());
        let outcome = self.run(QueryOperation::Update, &sql, &values)?;
        Ok(ExecResult::from(outcome))
    }

    /// Delete rows matching `where_clause`.
    ///
    /// # Errors
    ///
    /// Refuses to run with an empty `where_clause`.
    #[instrument(skip(self, state, where_params), fields(table = %state.table()))]
    pub fn delete(
        &mut self,
        state: &QueryState,
        where_clause: &str,
        where_params: impl Into<WhereParams>,
    ) -> Result<ExecResult, QueryError> {
        ensure_predicate(QueryOperation::Delete, where_clause)?;
        let sql = format!("DELETE FROM {} WHERE {}", state.table(), where_clause);
        let outcome = self.run(QueryOperation::Delete, &sql, &where_params.into().into_vec())?;
        Ok(ExecResult::from(outcome))
    }

    /// Delete every row whose `key` is one of `ids`; no ids is a no-op.
    pub fn delete_by_keys(
        &mut self,
        state: &QueryState,
        key: &str,
        ids: &[JsonValue],
    ) -> Result<ExecResult, QueryError> {
        ensure_identifier(QueryOperation::Delete, key)?;
        if ids.is_empty() {
            debug!("No keys to delete");
            return Ok(ExecResult::default());
        }
        let clause = format!("{} IN ({})", key, placeholders(ids.len()));
        self.delete(state, &clause, ids.to_vec())
    }
}

impl<E> QueryExecutor<E> {
    /// Placeholder for a value written to `column`, cast on PostgreSQL when
    /// the column's type has no assignment cast from text.
    fn placeholder(&self, state: &QueryState, column: &str) -> String {
        let cast = match self.dialect {
            Dialect::MySql => None,
            Dialect::Postgres => state.column_type(column).and_then(pg_cast),
        };
        match cast {
            Some(cast) => format!("CAST(? AS {})", cast),
            None => "?".to_string(),
        }
    }

    fn assignments(&self, state: &QueryState, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| format!("{} = {}", c, self.placeholder(state, c)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn push_clause(sql: &mut String, clause: &str) {
    if !clause.is_empty() {
        sql.push(' ');
        sql.push_str(clause);
    }
}

fn allowed(
    state: &QueryState,
    fields: impl IntoIterator<Item = (String, JsonValue)>,
) -> (Vec<String>, Vec<JsonValue>) {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (key, value) in fields {
        if state.attributes().contains(&key.as_str()) {
            columns.push(key);
            values.push(value);
        } else {
            debug!(key = %key, "Dropping field outside attribute allow-list");
        }
    }
    (columns, values)
}

#[track_caller]
fn ensure_predicate(operation: QueryOperation, where_clause: &str) -> Result<(), QueryError> {
    if where_clause.trim().is_empty() {
        error!(%operation, "Refusing statement without predicate");
        return Err(QueryError::new(operation, QueryErrorKind::EmptyPredicate));
    }
    Ok(())
}

fn json_to_count(value: &JsonValue) -> Option<u64> {
    match value {
        JsonValue::Number(n) => n.as_u64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedExecutor;
    use serde_json::json;
    use tabula_core::ColumnDescriptor;

    const ATTRS: &[&str] = &["name", "email"];

    fn state() -> QueryState {
        let mut state = QueryState::new("member", Dialect::MySql);
        state.set_attributes(ATTRS);
        state
    }

    fn config(dialect: Dialect) -> TableConfig {
        TableConfig::builder().dialect(dialect).build().unwrap()
    }

    fn fields() -> Vec<(String, JsonValue)> {
        vec![
            ("name".to_string(), json!("Kim")),
            ("is_admin".to_string(), json!(1)),
            ("email".to_string(), json!("kim@example.com")),
        ]
    }

    #[test]
    fn test_count_memoizes() {
        let scripted = ScriptedExecutor::new().on("COUNT(*)", ScriptedExecutor::rows(json!([{"cnt": 42}])));
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::MySql));
        let mut state = state();
        assert_eq!(exec.row_count(&mut state).unwrap(), 42);
        assert_eq!(exec.row_count(&mut state).unwrap(), 42);
        assert_eq!(exec.inner_mut().executed().len(), 1);
        assert_eq!(
            exec.inner_mut().executed()[0].sql(),
            "SELECT COUNT(*) AS cnt FROM member WHERE (1)"
        );
    }

    #[test]
    fn test_count_ignores_group_clause() {
        let scripted = ScriptedExecutor::new().on(
            "COUNT(*)",
            ScriptedExecutor::rows(json!([{"cnt": 13}])),
        );
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::MySql));
        let mut state = state();
        state.set_group("GROUP BY level");
        assert_eq!(exec.count(&mut state).unwrap(), 13);
        assert_eq!(state.cached_row_count(), &Some(13));
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "SELECT COUNT(*) AS cnt FROM member WHERE (1)"
        );
    }

    #[test]
    fn test_count_accepts_text_numbers() {
        let scripted = ScriptedExecutor::new().on("COUNT", ScriptedExecutor::rows(json!([{"cnt": "7"}])));
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::MySql));
        assert_eq!(exec.count(&mut state()).unwrap(), 7);
    }

    #[test]
    fn test_count_without_rows_is_error() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let err = exec.count(&mut state()).unwrap_err();
        assert_eq!(err.operation, QueryOperation::Count);
    }

    #[test]
    fn test_list_pages_by_navigation() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::Postgres));
        let params = NormalizedQueryParams::new(None, None, None, None, 10, 3);
        let mut state = QueryState::new("member", Dialect::Postgres);
        state.set_predicate("(level > ?)", [json!(1)]);
        exec.list(&state, &params).unwrap();
        let executed = exec.inner_mut().last().unwrap().clone();
        assert_eq!(
            executed.sql(),
            "SELECT * FROM member WHERE (level > $1) LIMIT 10 OFFSET 20"
        );
        assert_eq!(executed.params(), &vec![json!(1)]);
    }

    #[test]
    fn test_list_explicit_clauses() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let mut state = state();
        state
            .set_select("id, name")
            .set_group("GROUP BY name")
            .set_order("ORDER BY name")
            .set_limit("LIMIT 3");
        exec.list(&state, &NormalizedQueryParams::default()).unwrap();
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "SELECT id, name FROM member WHERE (1) GROUP BY name ORDER BY name LIMIT 3"
        );
    }

    #[test]
    fn test_get_by_key_missing_row() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        assert!(exec.get_by_key(&state(), "id", 5).unwrap().is_none());
        assert_eq!(exec.inner_mut().last().unwrap().params(), &vec![json!(5)]);
    }

    #[test]
    fn test_get_by_key_rejects_bad_identifier() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let err = exec.get_by_key(&state(), "id = 1 OR 1", 5).unwrap_err();
        assert!(matches!(err.kind, QueryErrorKind::InvalidIdentifier(_)));
        assert!(exec.inner_mut().executed().is_empty());
    }

    #[test]
    fn test_insert_mysql_set_form() {
        let scripted = ScriptedExecutor::new().on(
            "INSERT",
            ExecOutcome::default().with_rows_affected(1u64).with_last_insert_id("12"),
        );
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::MySql));
        let result = exec.insert(&state(), fields()).unwrap();
        assert_eq!(result.last_insert_id(), &Some("12".to_string()));
        let executed = exec.inner_mut().last().unwrap().clone();
        assert_eq!(executed.sql(), "INSERT INTO member SET name = ?, email = ?");
        assert_eq!(executed.params(), &vec![json!("Kim"), json!("kim@example.com")]);
    }

    #[test]
    fn test_insert_postgres_returning() {
        let scripted =
            ScriptedExecutor::new().on("INSERT", ScriptedExecutor::rows(json!([{"id": 31}])));
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::Postgres));
        let result = exec.insert(&state(), fields()).unwrap();
        assert_eq!(result.last_insert_id(), &Some("31".to_string()));
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "INSERT INTO member (name, email) VALUES ($1, $2) RETURNING id"
        );
    }

    fn typed_state() -> QueryState {
        let mut state = QueryState::new("member", Dialect::Postgres);
        state
            .set_attributes(&["name", "joined_on", "active", "level"])
            .set_column_types(&[
                ColumnDescriptor::new("id", "id", "integer"),
                ColumnDescriptor::new("name", "name", "character varying"),
                ColumnDescriptor::new("joined_on", "joined_on", "date"),
                ColumnDescriptor::new("active", "active", "boolean"),
                ColumnDescriptor::new("level", "level", "integer"),
            ]);
        state
    }

    fn typed_fields() -> Vec<(String, JsonValue)> {
        vec![
            ("name".to_string(), json!("Kim")),
            ("joined_on".to_string(), json!("2024-03-01")),
            ("active".to_string(), json!("true")),
            ("level".to_string(), json!(3)),
        ]
    }

    #[test]
    fn test_insert_postgres_casts_non_text_columns() {
        let scripted =
            ScriptedExecutor::new().on("INSERT", ScriptedExecutor::rows(json!([{"id": 4}])));
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::Postgres));
        exec.insert(&typed_state(), typed_fields()).unwrap();
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "INSERT INTO member (name, joined_on, active, level) \
             VALUES ($1, CAST($2 AS date), CAST($3 AS boolean), $4) RETURNING id"
        );
    }

    #[test]
    fn test_update_postgres_casts_non_text_columns() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::Postgres));
        exec.update(&typed_state(), typed_fields(), "id = ?", json!(4))
            .unwrap();
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "UPDATE member SET name = $1, joined_on = CAST($2 AS date), \
             active = CAST($3 AS boolean), level = $4 WHERE id = $5"
        );
    }

    #[test]
    fn test_mysql_never_casts() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        exec.insert(&typed_state(), typed_fields()).unwrap();
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "INSERT INTO member SET name = ?, joined_on = ?, active = ?, level = ?"
        );
    }

    #[test]
    fn test_list_huge_page_does_not_overflow() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let params = NormalizedQueryParams::new(None, None, None, None, 1_000_000_000, 100_000_000_000);
        exec.list(&state(), &params).unwrap();
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            &format!(
                "SELECT * FROM member WHERE (1) LIMIT 1000000000 OFFSET {}",
                tabula_core::MAX_OFFSET
            )
        );
    }

    #[test]
    fn test_update_requires_predicate() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let err = exec.update(&state(), fields(), "  ", WhereParams::None).unwrap_err();
        assert!(matches!(err.kind, QueryErrorKind::EmptyPredicate));
        assert!(exec.inner_mut().executed().is_empty());
    }

    #[test]
    fn test_update_binds_fields_then_predicate() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::Postgres));
        exec.update(&state(), fields(), "id = ?", json!(9)).unwrap();
        let executed = exec.inner_mut().last().unwrap().clone();
        assert_eq!(
            executed.sql(),
            "UPDATE member SET name = $1, email = $2 WHERE id = $3"
        );
        assert_eq!(executed.params()[2], json!(9));
    }

    #[test]
    fn test_update_without_allowed_fields_is_noop() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let only_denied = vec![("is_admin".to_string(), json!(1))];
        let result = exec.update(&state(), only_denied, "id = ?", json!(1)).unwrap();
        assert_eq!(result, ExecResult::default());
        assert!(exec.inner_mut().executed().is_empty());
    }

    #[test]
    fn test_delete_requires_predicate() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        let err = exec.delete(&state(), "", WhereParams::None).unwrap_err();
        assert_eq!(err.operation, QueryOperation::Delete);
    }

    #[test]
    fn test_delete_by_keys() {
        let scripted =
            ScriptedExecutor::new().on("DELETE", ExecOutcome::default().with_rows_affected(2u64));
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::MySql));
        let result = exec
            .delete_by_keys(&state(), "id", &[json!(3), json!(8)])
            .unwrap();
        assert_eq!(result.rows_affected(), &2);
        assert_eq!(
            exec.inner_mut().last().unwrap().sql(),
            "DELETE FROM member WHERE id IN (?, ?)"
        );
    }

    #[test]
    fn test_delete_by_keys_empty_is_noop() {
        let mut exec = QueryExecutor::new(ScriptedExecutor::new(), &config(Dialect::MySql));
        exec.delete_by_keys(&state(), "id", &[]).unwrap();
        assert!(exec.inner_mut().executed().is_empty());
    }

    #[test]
    fn test_execution_failure_carries_operation() {
        let scripted = ScriptedExecutor::new().fail_on("SELECT", "server has gone away");
        let mut exec = QueryExecutor::new(scripted, &config(Dialect::MySql));
        let err = exec.list(&state(), &NormalizedQueryParams::default()).unwrap_err();
        assert_eq!(err.operation, QueryOperation::List);
        assert!(err.to_string().contains("server has gone away"));
    }
}
