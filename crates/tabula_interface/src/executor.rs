//! Statement execution seam.

use serde_json::Value as JsonValue;
use tabula_core::ExecOutcome;
use tabula_error::ExecutionError;

/// Executes one prepared statement with positional bound values.
///
/// Implementations receive SQL whose placeholders are already in the form
/// their backend expects and must bind `params` in order. They never
/// retry: a failed insert is not safe to replay.
pub trait StatementExecutor {
    /// Execute `sql`, binding `params` positionally.
    ///
    /// # Errors
    ///
    /// Any backend failure is reported as an [`ExecutionError`].
    fn execute(&mut self, sql: &str, params: &[JsonValue]) -> Result<ExecOutcome, ExecutionError>;
}

impl<T> StatementExecutor for &mut T
where
    T: StatementExecutor + ?Sized,
{
    fn execute(&mut self, sql: &str, params: &[JsonValue]) -> Result<ExecOutcome, ExecutionError> {
        (**self).execute(sql, params)
    }
}

impl<T> StatementExecutor for Box<T>
where
    T: StatementExecutor + ?Sized,
{
    fn execute(&mut self, sql: &str, params: &[JsonValue]) -> Result<ExecOutcome, ExecutionError> {
        (**self).execute(sql, params)
    }
}
