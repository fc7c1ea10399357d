use axum::extract::{Path, State};
use axum::response::Redirect;
use pitchdeck_core::error::CoreError;
use pitchdeck_core::types::DeckId;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /view/{id}
///
/// Shareable link to a public deck: redirects to its HTML artifact.
/// Private, unknown and failed decks are 404.
pub async fn view_deck(
    State(state): State<AppState>,
    Path(deck_id): Path<DeckId>,
) -> AppResult<Redirect> {
    let deck = state.decks.get_public(deck_id).await?;
    let html_url = deck
        .html_url
        .ok_or_else(|| CoreError::deck_not_found(deck_id))?;

    Ok(Redirect::temporary(&html_url))
}
