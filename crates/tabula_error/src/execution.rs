//! Statement execution error.

/// Failure reported by a statement executor.
///
/// Executors collapse every backend failure (constraint violation, lost
/// connection, malformed SQL) into this one kind; the query layer attaches
/// the operation that was running.
///
/// # Examples
///
/// ```
/// use tabula_error::ExecutionError;
///
/// let err = ExecutionError::new("duplicate key value");
/// assert!(err.message().contains("duplicate"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Execution Error: {} at line {} in {}", message, line, file)]
pub struct ExecutionError {
    message: String,
    line: u32,
    file: &'static str,
}

impl ExecutionError {
    /// Create a new execution error with automatic location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Backend message describing the failure.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Line number where the error was created.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// File where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }
}

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for ExecutionError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        ExecutionError::new(err.to_string())
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for ExecutionError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        ExecutionError::new(format!("connection failed: {}", err))
    }
}

#[cfg(feature = "database")]
impl From<diesel::r2d2::PoolError> for ExecutionError {
    #[track_caller]
    fn from(err: diesel::r2d2::PoolError) -> Self {
        ExecutionError::new(format!("connection pool exhausted: {}", err))
    }
}
