use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    /// Decks whose progress channel is still open.
    in_flight_decks: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let in_flight_decks = state.decks.tracker().in_flight_count().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        in_flight_decks,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
