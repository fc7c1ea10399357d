use axum::response::IntoResponse;
use axum::Json;
use pitchdeck_core::themes::{palette_for, AVAILABLE_THEMES};
use serde::Serialize;

use crate::response::DataResponse;

/// A render theme and its default colours.
#[derive(Debug, Serialize)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub background_color: String,
    pub text_color: String,
}

/// GET /api/v1/themes
pub async fn list_themes() -> impl IntoResponse {
    let themes: Vec<ThemeInfo> = AVAILABLE_THEMES
        .iter()
        .map(|&name| {
            let palette = palette_for(name, None, None);
            ThemeInfo {
                name,
                background_color: palette.background,
                text_color: palette.text,
            }
        })
        .collect();

    Json(DataResponse { data: themes })
}
