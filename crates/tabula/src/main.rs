//! Tabula CLI - print paged table views as JSON.
//!
//! Usage:
//!   cargo run -p tabula --features database -- list member --query "sst=name&page=2"

use clap::Parser;
use tabula::cli::{Cli, Commands, handle_list_command, handle_show_command};
use tabula::{Dialect, PgExecutor, TableConfig, create_pool_from_url, init_tracing};
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    let mut config = match &cli.config {
        Some(path) => TableConfig::from_file(path)?,
        None => TableConfig::from_env()?,
    };
    if *config.dialect() != Dialect::Postgres {
        warn!(dialect = %config.dialect(), "The CLI only connects to PostgreSQL, switching dialect");
        config = config.with_dialect(Dialect::Postgres);
    }

    let database_url = cli.database_url.as_deref().ok_or("DATABASE_URL not provided")?;
    let pool = create_pool_from_url(database_url)?;
    let executor = PgExecutor::from_pool(&pool)?;
    info!(schema = %config.schema_name(), "Connected");

    let output = match &cli.command {
        Commands::List {
            table,
            query,
            base_url,
        } => handle_list_command(&config, executor, table, query, base_url.as_deref(), cli.pretty)?,
        Commands::Show { table, id, query } => {
            handle_show_command(&config, executor, table, id, query, cli.pretty)?
        }
    };

    println!("{}", output);
    Ok(())
}
