//! Server-sent progress stream of an in-flight deck.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use pitchdeck_core::error::CoreError;
use pitchdeck_core::types::DeckId;

use crate::error::AppResult;
use crate::middleware::auth::StreamAuthUser;
use crate::state::AppState;

/// SSE event name of every progress event.
pub const PROGRESS_EVENT: &str = "message";

/// GET /api/v1/pitch-decks/{id}/progress
///
/// Relays every progress event of the deck, in order, until its terminal
/// event; then the response ends. Unknown decks, decks owned by someone
/// else and decks that already finished are all 404, so callers fall back
/// to `GET /pitch-decks/{id}`.
pub async fn stream_progress(
    StreamAuthUser(auth): StreamAuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DeckId>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let subscription = state
        .decks
        .subscribe(deck_id, &auth.user_id)
        .await
        .ok_or_else(|| CoreError::deck_not_found(deck_id))?;

    tracing::debug!(deck_id = %deck_id, user_id = %auth.user_id, "Progress stream opened");

    let events = subscription
        .into_stream()
        .map(|payload| Ok(Event::default().event(PROGRESS_EVENT).data(payload)));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
