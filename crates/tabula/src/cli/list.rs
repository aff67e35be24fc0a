//! List command handler.

use tabula_core::TableConfig;
use tabula_database::TableResource;
use tabula_error::QueryOperation;
use tabula_interface::{JsonPresenter, RawParams, StatementExecutor};

/// Handles the list command.
///
/// # Arguments
///
/// * `config` - Table configuration
/// * `executor` - Statement executor to run against
/// * `table` - Table to list
/// * `query` - Navigation query string
/// * `base_url` - Base URL for links, `/<table>` when absent
/// * `pretty` - Indent the JSON output
///
/// # Returns
///
/// The list page payload as JSON.
#[tracing::instrument(skip(config, executor, query), fields(table = %table))]
pub fn handle_list_command<E: StatementExecutor>(
    config: &TableConfig,
    executor: E,
    table: &str,
    query: &str,
    base_url: Option<&str>,
    pretty: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    super::check_table(QueryOperation::List, table)?;

    let request = RawParams::parse(query);
    let base_url = base_url
        .map(str::to_string)
        .unwrap_or_else(|| format!("/{}", table));
    let presenter = if pretty {
        JsonPresenter::pretty()
    } else {
        JsonPresenter::new()
    };

    let mut resource = TableResource::for_table(config, executor, table, &request, base_url);
    let output = resource.present_list(&presenter)??;
    tracing::info!(page = resource.params().page_number(), "Listed table");
    Ok(output)
}
