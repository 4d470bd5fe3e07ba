use clap::Parser;
use connectors::{MySqlAdapter, PgAdapter, SqlAdapter};
use engine_core::{observer::Observer, schema_builder, validate, verify, run_migration, StdoutObserver};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::config::Config;
use crate::error::CliError;

mod commands;
mod config;
mod error;
mod output;

#[derive(Parser)]
#[command(name = "pg2mysql", version, about = "Migrates row data from PostgreSQL into MySQL")]
struct Cli {
    /// Path to the YAML config file describing both connections.
    #[arg(short, long)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

/// Observer used for `verify`: the CLI prints the terse per-table summary
/// itself (spec §6), so lifecycle chatter is suppressed here.
struct NoopObserver;
impl Observer for NoopObserver {}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = %e, "pg2mysql failed");
            1
        }
    };
    process::exit(exit_code);
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = Config::read(&cli.config)?;

    let source = PgAdapter::connect(
        config.postgresql.client_config(),
        config.postgresql.database.clone(),
        config.postgresql.tls_mode(),
    )
    .await?;
    let destination = MySqlAdapter::connect(&config.mysql.url(), config.mysql.database.clone()).await?;

    let result = dispatch(&cli.command, &source, &destination).await;

    // Close on every exit path, success or failure, regardless of which
    // branch above produced the result.
    let _ = destination.close().await;
    let _ = source.close().await;

    result
}

async fn dispatch(command: &Commands, source: &PgAdapter, destination: &MySqlAdapter) -> Result<(), CliError> {
    let source_schema = schema_builder::build(source).await?;

    match command {
        Commands::Validate => {
            let destination_schema = schema_builder::build(destination).await?;
            let results = validate(source, &source_schema, &destination_schema).await?;
            for result in &results {
                let table = source_schema.get_table(&result.table_name)?;
                println!("{}", output::validation_line(table, result));
            }
        }
        Commands::Verify => {
            let observer = NoopObserver;
            let results = verify(source, destination, &source_schema, &observer).await;
            for result in &results {
                println!("{}", output::verification_line(result));
            }
        }
        Commands::Migrate { truncate } => {
            let observer = StdoutObserver;
            run_migration(source, destination, &source_schema, *truncate, &observer).await?;
        }
    }

    Ok(())
}
