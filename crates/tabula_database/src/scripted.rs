//! Scripted statement executor.
//!
//! Records every statement and answers from canned responses keyed by a
//! substring of the SQL. Used by the test suites and for dry runs.

use serde_json::Value as JsonValue;
use tabula_core::{ExecOutcome, Row};
use tabula_error::ExecutionError;
use tabula_interface::StatementExecutor;
use tracing::debug;

/// A statement the executor was asked to run.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct ExecutedStatement {
    /// Statement text as executed
    sql: String,
    /// Bound values in placeholder order
    params: Vec<JsonValue>,
}

#[derive(Debug, Clone)]
struct Response {
    needle: String,
    result: Result<ExecOutcome, String>,
}

/// Statement executor answering from a script.
///
/// Responses are matched in registration order against the statement text;
/// the first whose needle occurs in the SQL wins. Unmatched statements
/// succeed with an empty outcome.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tabula_database::ScriptedExecutor;
/// use tabula_interface::StatementExecutor;
///
/// let mut exec = ScriptedExecutor::new()
///     .on("COUNT", ScriptedExecutor::rows(json!([{"cnt": 3}])))
///     .fail_on("DELETE", "foreign key violation");
///
/// let outcome = exec.execute("SELECT COUNT(*) AS cnt FROM t", &[]).unwrap();
/// assert_eq!(outcome.rows().len(), 1);
/// assert!(exec.execute("DELETE FROM t WHERE id = ?", &[json!(1)]).is_err());
/// assert_eq!(exec.executed().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    responses: Vec<Response>,
    executed: Vec<ExecutedStatement>,
}

impl ScriptedExecutor {
    /// Executor with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer statements containing `needle` with `outcome`.
    pub fn on(mut self, needle: impl Into<String>, outcome: ExecOutcome) -> Self {
        self.responses.push(Response {
            needle: needle.into(),
            result: Ok(outcome),
        });
        self
    }

    /// Fail statements containing `needle` with `message`.
    pub fn fail_on(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.push(Response {
            needle: needle.into(),
            result: Err(message.into()),
        });
        self
    }

    /// Answer catalog queries with the given `(name, comment, data_type)` columns.
    pub fn with_columns(self, columns: &[(&str, Option<&str>, &str)]) -> Self {
        let rows = columns
            .iter()
            .map(|(name, comment, data_type)| {
                let mut row = Row::new();
                row.insert("column_name".to_string(), JsonValue::from(*name));
                row.insert(
                    "column_comment".to_string(),
                    comment.map_or(JsonValue::Null, JsonValue::from),
                );
                row.insert("data_type".to_string(), JsonValue::from(*data_type));
                row
            })
            .collect();
        self.on("information_schema", ExecOutcome::from_rows(rows))
    }

    /// Outcome holding the objects of a JSON array as rows.
    ///
    /// Non-object elements are skipped.
    pub fn rows(value: JsonValue) -> ExecOutcome {
        let rows = match value {
            JsonValue::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    JsonValue::Object(row) => Some(row),
                    _ => None,
                })
                .collect(),
            JsonValue::Object(row) => vec![row],
            _ => Vec::new(),
        };
        ExecOutcome::from_rows(rows)
    }

    /// Statements run so far, oldest first.
    pub fn executed(&self) -> &[ExecutedStatement] {
        &self.executed
    }

    /// Most recent statement.
    pub fn last(&self) -> Option<&ExecutedStatement> {
        self.executed.last()
    }

    /// Statements whose text contains `needle`.
    pub fn matching(&self, needle: &str) -> Vec<&ExecutedStatement> {
        self.executed
            .iter()
            .filter(|statement| statement.sql.contains(needle))
            .collect()
    }
}

impl StatementExecutor for ScriptedExecutor {
    fn execute(&mut self, sql: &str, params: &[JsonValue]) -> Result<ExecOutcome, ExecutionError> {
        self.executed.push(ExecutedStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        let response = self
            .responses
            .iter()
            .find(|response| sql.contains(&response.needle));
        debug!(sql, matched = response.is_some(), "Scripted statement");
        match response {
            Some(Response { result: Ok(outcome), .. }) => Ok(outcome.clone()),
            Some(Response { result: Err(message), .. }) => Err(ExecutionError::new(message.clone())),
            None => Ok(ExecOutcome::default()),
        }
    }
}
