pub mod decks;
pub mod health;
pub mod uploads;
pub mod view;

use axum::routing::get;
use axum::Router;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /themes                                  list themes (public)
///
/// /pitch-decks                             list, create
/// /pitch-decks/{id}                        get
/// /pitch-decks/{id}/visibility             update visibility
/// /pitch-decks/{id}/progress               progress stream (SSE)
///
/// /uploads/images                          upload image
/// ```
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/themes", get(handlers::themes::list_themes))
        .nest("/pitch-decks", decks::router())
        .nest("/uploads", uploads::router(config.max_upload_bytes))
}
