//! Error types for the Tabula library.
//!
//! Every error records the line and file where it was constructed, so a
//! failure deep inside query assembly can be traced without a backtrace.
//!
//! The taxonomy mirrors how failures are handled by callers:
//!
//! - [`SchemaError`] - the catalog is unreachable or the table is missing. Fatal.
//! - [`QueryError`] - a statement failed or was refused before execution.
//! - [`ExecutionError`] - the single generic failure of a statement executor.
//! - [`ConfigError`] - configuration could not be read or is invalid.
//!
//! Parameters that fail validation are not errors at all; they are dropped and
//! replaced by their defaults.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod execution;
mod query;
mod schema;

pub use config::{ConfigError, ConfigErrorKind};
pub use execution::ExecutionError;
pub use query::{QueryError, QueryErrorKind, QueryOperation};
pub use schema::{SchemaError, SchemaErrorKind};

/// Crate-level error variants.
#[derive(Debug, Clone, derive_more::From, derive_more::Display)]
pub enum TabulaErrorKind {
    /// Catalog or table lookup failed
    #[display("{_0}")]
    Schema(SchemaError),
    /// Statement failed or was refused
    #[display("{_0}")]
    Query(QueryError),
    /// Raw executor failure outside of a query operation
    #[display("{_0}")]
    Execution(ExecutionError),
    /// Configuration problem
    #[display("{_0}")]
    Config(ConfigError),
}

/// Tabula error with kind discrimination.
#[derive(Debug, Clone, derive_more::Display)]
#[display("Tabula Error: {}", _0)]
pub struct TabulaError(Box<TabulaErrorKind>);

impl TabulaError {
    /// Create a new error from a kind.
    pub fn new(kind: TabulaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TabulaErrorKind {
        &self.0
    }
}

impl std::error::Error for TabulaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            TabulaErrorKind::Schema(e) => Some(e),
            TabulaErrorKind::Query(e) => Some(e),
            TabulaErrorKind::Execution(e) => Some(e),
            TabulaErrorKind::Config(e) => Some(e),
        }
    }
}

// Generic From implementation for any type that converts to TabulaErrorKind
impl<T> From<T> for TabulaError
where
    T: Into<TabulaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tabula operations.
pub type TabulaResult<T> = std::result::Result<T, TabulaError>;
