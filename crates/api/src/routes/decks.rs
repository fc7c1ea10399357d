//! Route definitions for the `/pitch-decks` resource.

use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::{decks, progress};
use crate::state::AppState;

/// Routes mounted at `/pitch-decks`.
///
/// ```text
/// GET    /                  -> list_decks
/// POST   /                  -> create_deck
/// GET    /{id}              -> get_deck
/// PATCH  /{id}/visibility   -> update_visibility
/// GET    /{id}/progress     -> stream_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(decks::list_decks).post(decks::create_deck))
        .route("/{id}", get(decks::get_deck))
        .route("/{id}/visibility", patch(decks::update_visibility))
        .route("/{id}/progress", get(progress::stream_progress))
}
