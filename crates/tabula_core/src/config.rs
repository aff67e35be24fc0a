//! Table binding configuration.
//!
//! One `TableConfig` is resolved at startup and shared read-only by every
//! request-scoped unit of work.

use crate::DEFAULT_ROWS;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tabula_error::{ConfigError, ConfigErrorKind};

/// SQL dialect of the backing database.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Dialect {
    /// MySQL / MariaDB: `?` placeholders, `INSERT ... SET`
    #[default]
    #[strum(to_string = "mysql", serialize = "mariadb")]
    MySql,
    /// PostgreSQL: `$n` placeholders, `INSERT ... VALUES ... RETURNING`
    #[strum(to_string = "postgres", serialize = "postgresql")]
    Postgres,
}

impl Dialect {
    /// Always-true predicate used as the default WHERE clause.
    pub fn tautology(self) -> &'static str {
        match self {
            Dialect::MySql => "(1)",
            Dialect::Postgres => "(1 = 1)",
        }
    }
}

/// Labels of the pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct PagerLabels {
    /// Link to page one
    first: String,
    /// Link to the page before the window
    previous: String,
    /// Link to the page after the window
    next: String,
    /// Link to the final page
    last: String,
}

impl Default for PagerLabels {
    fn default() -> Self {
        Self {
            first: "First".to_string(),
            previous: "Prev".to_string(),
            next: "Next".to_string(),
            last: "Last".to_string(),
        }
    }
}

impl PagerLabels {
    /// Create labels from explicit strings.
    pub fn new(
        first: impl Into<String>,
        previous: impl Into<String>,
        next: impl Into<String>,
        last: impl Into<String>,
    ) -> Self {
        Self {
            first: first.into(),
            previous: previous.into(),
            next: next.into(),
            last: last.into(),
        }
    }
}

/// Configuration shared by every table-bound unit of work.
///
/// # Examples
///
/// ```
/// use tabula_core::{Dialect, TableConfig};
///
/// let config: TableConfig = toml::from_str(r#"
///     schema_name = "shop"
///     dialect = "postgres"
///     rows_per_page = 50
/// "#).unwrap();
/// assert_eq!(config.dialect(), &Dialect::Postgres);
/// assert_eq!(config.page_window(), &5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
#[serde(default)]
#[builder(setter(into), default)]
pub struct TableConfig {
    /// Schema (database) the tables live in
    schema_name: String,
    /// SQL dialect
    dialect: Dialect,
    /// Default page size
    rows_per_page: u64,
    /// Number of page links in the pagination window
    page_window: u64,
    /// Primary key column used by row lookups and saves
    primary_key: String,
    /// Expression used by row counts
    count_expr: String,
    /// Pagination labels
    labels: PagerLabels,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            schema_name: String::new(),
            dialect: Dialect::default(),
            rows_per_page: DEFAULT_ROWS,
            page_window: 5,
            primary_key: "id".to_string(),
            count_expr: "COUNT(*)".to_string(),
            labels: PagerLabels::default(),
        }
    }
}

impl TableConfig {
    /// Create a new builder.
    pub fn builder() -> TableConfigBuilder {
        TableConfigBuilder::default()
    }

    /// Copy with the dialect replaced.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Load configuration from a TOML file.
    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            tracing::error!(error = %e, "Failed to read config file");
            ConfigError::new(ConfigErrorKind::Read(e.to_string()))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse config file");
            ConfigError::new(ConfigErrorKind::Parse(e.to_string()))
        })?;

        config.validate()?;
        tracing::debug!(schema = %config.schema_name, dialect = %config.dialect, "Loaded table config");
        Ok(config)
    }

    /// Create config from environment variables.
    ///
    /// Reads:
    /// - `TABULA_SCHEMA` (default: empty)
    /// - `TABULA_DIALECT` (default: "mysql")
    /// - `TABULA_ROWS` (default: 20)
    /// - `TABULA_PAGE_WINDOW` (default: 5)
    /// - `TABULA_PRIMARY_KEY` (default: "id")
    #[tracing::instrument]
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(schema) = std::env::var("TABULA_SCHEMA") {
            config.schema_name = schema;
        }
        if let Ok(dialect) = std::env::var("TABULA_DIALECT") {
            config.dialect = dialect
                .parse()
                .map_err(|_| ConfigError::invalid("TABULA_DIALECT", format!("unknown dialect '{}'", dialect)))?;
        }
        if let Ok(rows) = std::env::var("TABULA_ROWS") {
            config.rows_per_page = parse_positive("TABULA_ROWS", &rows)?;
        }
        if let Ok(window) = std::env::var("TABULA_PAGE_WINDOW") {
            config.page_window = parse_positive("TABULA_PAGE_WINDOW", &window)?;
        }
        if let Ok(key) = std::env::var("TABULA_PRIMARY_KEY") {
            config.primary_key = key;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check invariants the rest of the workspace relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows_per_page == 0 {
            return Err(ConfigError::invalid("rows_per_page", "must be at least 1"));
        }
        if self.page_window == 0 {
            return Err(ConfigError::invalid("page_window", "must be at least 1"));
        }
        let key_ok = !self.primary_key.is_empty()
            && self
                .primary_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !key_ok {
            return Err(ConfigError::invalid(
                "primary_key",
                format!("'{}' is not a plain column name", self.primary_key),
            ));
        }
        Ok(())
    }
}

fn parse_positive(field: &str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::invalid(field, format!("'{}' is not a positive integer", raw))),
    }
}
