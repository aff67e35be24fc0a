//! Query error types.

use crate::ExecutionError;

/// Query operation that was running when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QueryOperation {
    /// Row count
    #[display("count")]
    Count,
    /// Paged listing
    #[display("list")]
    List,
    /// Single-row lookup
    #[display("get_by_key")]
    GetByKey,
    /// Row insert
    #[display("insert")]
    Insert,
    /// Row update
    #[display("update")]
    Update,
    /// Row delete
    #[display("delete")]
    Delete,
}

/// Query error conditions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum QueryErrorKind {
    /// The executor failed the statement
    #[display("{_0}")]
    Execution(ExecutionError),
    /// A runtime identifier was not a plain column name
    #[display("Invalid identifier '{_0}'")]
    InvalidIdentifier(String),
    /// An update or delete was attempted without a predicate
    #[display("Refusing to run without a WHERE predicate")]
    EmptyPredicate,
}

/// Query error with source location tracking.
///
/// # Examples
///
/// ```
/// use tabula_error::{QueryError, QueryErrorKind, QueryOperation};
///
/// let err = QueryError::new(QueryOperation::Update, QueryErrorKind::EmptyPredicate);
/// assert!(format!("{}", err).contains("update"));
/// ```
#[derive(Debug, Clone, derive_more::Display)]
#[display(
    "Query Error during {}: {} at line {} in {}",
    operation,
    kind,
    line,
    file
)]
pub struct QueryError {
    /// Operation that failed
    pub operation: QueryOperation,
    /// The kind of error that occurred
    pub kind: QueryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl QueryError {
    /// Create a new QueryError with automatic location tracking.
    #[track_caller]
    pub fn new(operation: QueryOperation, kind: QueryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            operation,
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Wrap an executor failure for the given operation.
    #[track_caller]
    pub fn execution(operation: QueryOperation, cause: ExecutionError) -> Self {
        Self::new(operation, QueryErrorKind::Execution(cause))
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            QueryErrorKind::Execution(cause) => Some(cause),
            _ => None,
        }
    }
}
