//! HTTP server command for the spendctl expense API
//!
//! Runs the users/expenses/categories API against PostgreSQL, or against an
//! in-process store with `--memory`.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;

use spendctl_server::db::pool::DEFAULT_MAX_CONNECTIONS;
use spendctl_server::db::{create_pool_with_options, migrations, MemoryStore, PgStore, Store};
use spendctl_server::http::{run_server, AppState, ServerConfig};

use crate::config;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b', default_value = "127.0.0.1:3030")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Serve from an in-memory store instead of PostgreSQL (data is lost on exit)
    #[arg(long)]
    pub memory: bool,

    /// Do not create missing tables on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let store: Arc<dyn Store> = if args.memory {
        tracing::warn!("Using in-memory store; data will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let database_url = config::database_url(args.database_url)?;

        let pool = create_pool_with_options(&database_url, args.max_connections)
            .await
            .context("Failed to create database pool")?;

        if args.skip_migrations {
            tracing::info!("Skipping schema migrations");
        } else {
            migrations::run(&pool)
                .await
                .context("Failed to apply schema migrations")?;
        }

        Arc::new(PgStore::new(pool))
    };

    tracing::info!("Starting spendctl server on {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Blocks until ctrl-c / SIGTERM
    run_server(AppState::new(store), config)
        .await
        .context("Server error")?;

    Ok(())
}
