//! spendctl-server: expense tracking HTTP API
//!
//! CRUD endpoints for users, expenses and categories, backed by
//! PostgreSQL through sqlx (or an in-process store for tests and demos).

pub mod db;
pub mod http;
pub mod models;

pub use db::{DbError, MemoryStore, PgStore, Store};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
