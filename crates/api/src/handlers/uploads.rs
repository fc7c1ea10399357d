//! Image uploads referenced later from deck input.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pitchdeck_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the file.
pub const IMAGE_FIELD: &str = "image";

/// POST /api/v1/uploads/images
///
/// Accepts one image in the `image` field of a multipart body. Returns 201
/// with the stored image's public URL and generated filename.
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let limit = state.config.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| CoreError::Validation("Uploaded file has no filename".into()))?;
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > limit {
            return Err(AppError::PayloadTooLarge(format!(
                "Image exceeds the {limit} byte limit"
            )));
        }

        let uploaded = state
            .decks
            .upload_image(&auth.user_id, &original_name, bytes.to_vec())
            .await?;

        return Ok((StatusCode::CREATED, Json(DataResponse { data: uploaded })));
    }

    Err(CoreError::Validation(format!("Missing '{IMAGE_FIELD}' field")).into())
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
