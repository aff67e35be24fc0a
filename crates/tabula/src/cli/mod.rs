//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the tabula
//! binary. Handlers are generic over the statement executor so they run the
//! same against a live database and a script.

mod commands;
mod list;
mod show;

pub use commands::{Cli, Commands};
pub use list::handle_list_command;
pub use show::handle_show_command;

use tabula_database::is_identifier;
use tabula_error::{QueryError, QueryErrorKind, QueryOperation};

/// Refuse table names that are not a single plain identifier.
///
/// The catalog is searched within the configured schema, so a
/// schema-qualified name would never be found.
#[track_caller]
fn check_table(operation: QueryOperation, table: &str) -> Result<(), QueryError> {
    if is_identifier(table) && !table.contains('.') {
        return Ok(());
    }
    tracing::error!(table, "Refusing table name; set schema_name in the config to pick a schema");
    Err(QueryError::new(
        operation,
        QueryErrorKind::InvalidIdentifier(table.to_string()),
    ))
}
