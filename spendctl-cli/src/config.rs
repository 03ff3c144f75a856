//! Environment configuration
//!
//! Variables come from the process environment, then `./.env`, then
//! `~/.spendctl/.env`. dotenvy never overwrites a variable that is already
//! set, so earlier sources win.

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Directory for per-user spendctl files (`~/.spendctl`)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".spendctl"))
}

/// Load `.env` files into the process environment.
pub fn load_env() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => tracing::debug!("Loaded environment from {}", env_file.display()),
                Err(e) => tracing::warn!("Ignoring {}: {}", env_file.display(), e),
            }
        }
    }
}

/// Resolve the database URL from a flag value or `DATABASE_URL`.
pub fn database_url(flag: Option<String>) -> Result<String> {
    flag.or_else(|| std::env::var("DATABASE_URL").ok())
        .filter(|url| !url.trim().is_empty())
        .context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ~/.spendctl/.env",
        )
}
