//! Slide theme names and their default colour palettes.
//!
//! The render tool ships these four themes; anything else is rejected at
//! the request boundary before a deck is created.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const THEME_DEFAULT: &str = "default";
pub const THEME_GAIA: &str = "gaia";
pub const THEME_UNCOVER: &str = "uncover";
pub const THEME_ROSE_PINE: &str = "rose-pine";

/// Every theme the render tool accepts.
pub const AVAILABLE_THEMES: &[&str] = &[THEME_DEFAULT, THEME_GAIA, THEME_UNCOVER, THEME_ROSE_PINE];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Resolve the theme requested by a client.
///
/// An empty (or whitespace-only) theme falls back to [`THEME_DEFAULT`].
/// Names are matched case-sensitively, exactly as the render tool does.
pub fn resolve_theme(requested: &str) -> Result<&'static str, CoreError> {
    let requested = requested.trim();
    if requested.is_empty() {
        return Ok(THEME_DEFAULT);
    }

    AVAILABLE_THEMES
        .iter()
        .copied()
        .find(|t| *t == requested)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid theme '{requested}'. Must be one of: {AVAILABLE_THEMES:?}"
            ))
        })
}

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Background and text colour handed to the content generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: String,
    pub text: String,
}

/// Default palette for a theme, overridden field by field by any colours
/// the client supplied.
pub fn palette_for(theme: &str, background: Option<&str>, text: Option<&str>) -> Palette {
    let (default_bg, default_text) = match theme {
        THEME_GAIA => ("#fff", "#333"),
        THEME_UNCOVER => ("#333", "#fff"),
        THEME_ROSE_PINE => ("#191724", "#e0def4"),
        _ => ("white", "black"),
    };

    let pick = |given: Option<&str>, fallback: &str| {
        given
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    Palette {
        background: pick(background, default_bg),
        text: pick(text, default_text),
    }
}
