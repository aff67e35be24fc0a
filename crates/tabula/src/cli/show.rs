//! Show command handler.

use serde_json::Value as JsonValue;
use tabula_core::TableConfig;
use tabula_database::TableResource;
use tabula_error::QueryOperation;
use tabula_interface::{JsonPresenter, RawParams, StatementExecutor};

/// Primary key as typed on the command line: integers bind as numbers.
fn key_value(id: &str) -> JsonValue {
    id.trim()
        .parse::<i64>()
        .map(JsonValue::from)
        .unwrap_or_else(|_| JsonValue::from(id))
}

/// Handles the show command.
///
/// Prints `"row": null` when no row has the key.
#[tracing::instrument(skip(config, executor, query), fields(table = %table, id = %id))]
pub fn handle_show_command<E: StatementExecutor>(
    config: &TableConfig,
    executor: E,
    table: &str,
    id: &str,
    query: &str,
    pretty: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    super::check_table(QueryOperation::GetByKey, table)?;

    let request = RawParams::parse(query);
    let presenter = if pretty {
        JsonPresenter::pretty()
    } else {
        JsonPresenter::new()
    };

    let mut resource =
        TableResource::for_table(config, executor, table, &request, format!("/{}", table));
    Ok(resource.present_row(&presenter, key_value(id))??)
}
