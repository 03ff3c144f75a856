//! Schema command: create the users, categories and expenses tables

use anyhow::{Context, Result};
use clap::Parser;

use spendctl_server::db::{create_pool, migrations};

use crate::config;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Apply the schema and exit. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let database_url = config::database_url(args.database_url)?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to apply schema migrations")?;

    pool.close().await;
    tracing::info!("Schema is up to date");

    Ok(())
}
