use axum::routing::get;
use axum::Router;

use crate::handlers::view;
use crate::state::AppState;

/// Public share links, mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new().route("/view/{id}", get(view::view_deck))
}
