//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse database tables through the Tabula query engine.
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(about = "Tabula - paged, sortable views of a single table")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML table configuration (defaults to TABULA_* environment variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true, global = true)]
    pub database_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Pretty-print the JSON payload
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page of a table with its pagination and sort links
    List {
        /// Table to list
        table: String,

        /// Navigation query string (e.g. "sst=name&sod=desc&page=2")
        #[arg(short, long, default_value = "")]
        query: String,

        /// Base URL for generated links (defaults to /<table>)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Print one row looked up by primary key
    Show {
        /// Table to read
        table: String,

        /// Primary key value
        id: String,

        /// Navigation query string carried into hidden fields
        #[arg(short, long, default_value = "")]
        query: String,
    },
}
