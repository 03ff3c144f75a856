//! Database layer - storage port, adapters, pool and schema
//!
//! # Design Principles
//!
//! - Handlers depend on the `Store` trait, never on a concrete adapter
//! - Connection pool (max 5 connections by default) - no Arc<Mutex<Connection>>
//! - Dynamic filters and partial updates use bound parameters only
//! - Update/delete report rows affected; callers decide what zero means

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_options};
pub use postgres::PgStore;
pub use store::{DbError, Store};
