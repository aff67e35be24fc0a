//! Configuration error types.

/// Configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Config file could not be read
    #[display("Failed to read config file: {_0}")]
    Read(String),
    /// Config file is not valid TOML for the expected shape
    #[display("Failed to parse config: {_0}")]
    Parse(String),
    /// A field holds an unusable value
    #[display("Invalid value for '{field}': {reason}")]
    Invalid {
        /// Field or environment variable name
        field: String,
        /// Why the value was refused
        reason: String,
    },
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use tabula_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Parse("expected table".into()));
/// assert!(err.to_string().contains("expected table"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    #[error(not(source))]
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an invalid field value.
    #[track_caller]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Invalid {
            field: field.into(),
            reason: reason.into(),
        })
    }
}
