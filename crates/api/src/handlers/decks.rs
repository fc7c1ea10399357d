//! Handlers for the `/pitch-decks` resource.
//!
//! All endpoints require authentication via [`AuthUser`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pitchdeck_core::deck::PitchDeckData;
use pitchdeck_core::types::DeckId;
use pitchdeck_db::models::deck::UpdateVisibility;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/pitch-decks
///
/// Validate the deck input and start generating it. Returns 202 with the
/// new deck id; progress is streamed from `/{id}/progress`.
pub async fn create_deck(
    auth: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<PitchDeckData>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(mut data) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    data.normalize()?;

    let handle = state.decks.create(data, auth.user_id).await?;

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: handle })))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /api/v1/pitch-decks
///
/// The caller's finished decks, newest first.
pub async fn list_decks(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let decks = state.decks.list_user_decks(&auth.user_id).await?;
    Ok(Json(DataResponse { data: decks }))
}

/// GET /api/v1/pitch-decks/{id}
///
/// A finished deck owned by the caller or marked public. Anything else,
/// including a deck still being generated, is 404.
pub async fn get_deck(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DeckId>,
) -> AppResult<impl IntoResponse> {
    let deck = state.decks.get(deck_id, &auth.user_id).await?;
    Ok(Json(DataResponse { data: deck }))
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// PATCH /api/v1/pitch-decks/{id}/visibility
///
/// Owner only. Returns the updated deck.
pub async fn update_visibility(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(deck_id): Path<DeckId>,
    payload: Result<Json<UpdateVisibility>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let deck = state
        .decks
        .update_visibility(deck_id, &auth.user_id, input.is_public)
        .await?;

    Ok(Json(DataResponse { data: deck }))
}
