//! Liveness check

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

/// Body of GET /health
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    /// Which store adapter is serving requests (`postgres` or `memory`)
    pub store: &'static str,
}

impl HealthStatus {
    fn ok(store: &'static str) -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            store,
        }
    }
}

/// GET /health - answers without a storage round-trip
async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus::ok(state.store().backend()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
