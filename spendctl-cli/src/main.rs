//! spendctl CLI - expense tracking API server
//!
//! Entry point for the `spendctl` binary:
//! - `serve` runs the HTTP API (PostgreSQL or in-memory store)
//! - `migrate` creates the database schema and exits

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use commands::{MigrateArgs, ServeArgs};
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "spendctl",
    author,
    version,
    about = "Expense tracking REST API for users, expenses and categories"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces to an OTLP endpoint (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Create the database schema if it does not exist
    Migrate(MigrateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads `env = "DATABASE_URL"`
    config::load_env();

    let cli = Cli::parse();

    // Held until main returns so buffered spans are flushed
    let _tracing = tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
    }
}
