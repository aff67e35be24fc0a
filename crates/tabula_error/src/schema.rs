//! Schema introspection error types.

/// Schema error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SchemaErrorKind {
    /// The catalog has no columns for the table
    #[display("Table '{schema}.{table}' not found in catalog")]
    TableNotFound {
        /// Schema (database) searched
        schema: String,
        /// Table looked up
        table: String,
    },
    /// The catalog query itself failed
    #[display("Catalog unavailable: {_0}")]
    CatalogUnavailable(String),
}

/// Schema error with source location tracking.
///
/// # Examples
///
/// ```
/// use tabula_error::{SchemaError, SchemaErrorKind};
///
/// let err = SchemaError::new(SchemaErrorKind::CatalogUnavailable("timeout".into()));
/// assert!(format!("{}", err).contains("timeout"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Schema Error: {} at line {} in {}", kind, line, file)]
pub struct SchemaError {
    /// The kind of error that occurred
    #[error(not(source))]
    pub kind: SchemaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SchemaError {
    /// Create a new SchemaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchemaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing table.
    #[track_caller]
    pub fn table_not_found(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::TableNotFound {
            schema: schema.into(),
            table: table.into(),
        })
    }
}
