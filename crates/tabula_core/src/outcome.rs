//! Statement outcomes.

use serde::{Deserialize, Serialize};

/// A result row keyed by column name, in projection order.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Everything a statement executor reports back for one statement.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_", into)]
pub struct ExecOutcome {
    /// Rows produced by the statement
    rows: Vec<Row>,
    /// Identifier generated by an insert, when the backend reports one
    #[setters(strip_option)]
    last_insert_id: Option<String>,
    /// Rows inserted, updated or deleted
    rows_affected: u64,
}

impl ExecOutcome {
    /// Outcome of a query returning the given rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let rows_affected = rows.len() as u64;
        Self {
            rows,
            last_insert_id: None,
            rows_affected,
        }
    }

    /// Take the rows out of the outcome.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// Result of an insert, update or delete.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct ExecResult {
    /// Rows affected by the statement
    rows_affected: u64,
    /// Generated identifier, when available
    last_insert_id: Option<String>,
}

impl From<ExecOutcome> for ExecResult {
    fn from(outcome: ExecOutcome) -> Self {
        Self {
            rows_affected: outcome.rows_affected,
            last_insert_id: outcome.last_insert_id,
        }
    }
}
