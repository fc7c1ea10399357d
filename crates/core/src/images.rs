//! Image reference classification and upload rules.

use crate::error::CoreError;

/// Web path prefix of images stored by the local upload fallback.
pub const LOCAL_UPLOADS_PREFIX: &str = "/uploads/";

/// Extension used when a remote image URL has none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".jpg";

/// Extensions accepted by the image upload endpoint (lowercase, no dot).
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// The three image slots a deck can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Logo,
    TeamPhoto,
    Diagram,
}

impl ImageKind {
    pub const ALL: [ImageKind; 3] = [Self::Logo, Self::TeamPhoto, Self::Diagram];

    /// File stem used inside the job directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::TeamPhoto => "team",
            Self::Diagram => "diagram",
        }
    }
}

/// Where an image reference submitted by a client points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource<'a> {
    /// Nothing was submitted for this slot.
    Empty,
    /// An `http(s)` URL to download.
    Remote(&'a str),
    /// A file previously stored by the local upload fallback; holds the path
    /// relative to the uploads directory.
    LocalUpload(&'a str),
    /// Anything else is handed to the render tool as-is.
    Verbatim(&'a str),
}

/// Classify a client-supplied image reference.
pub fn classify_image_ref(reference: &str) -> ImageSource<'_> {
    let reference = reference.trim();
    if reference.is_empty() {
        ImageSource::Empty
    } else if reference.starts_with("http://") || reference.starts_with("https://") {
        ImageSource::Remote(reference)
    } else if let Some(rel) = reference.strip_prefix(LOCAL_UPLOADS_PREFIX) {
        ImageSource::LocalUpload(rel)
    } else {
        ImageSource::Verbatim(reference)
    }
}

/// Extension (with leading dot) of the last path segment of a URL, ignoring
/// any query string or fragment. Falls back to [`DEFAULT_IMAGE_EXTENSION`].
pub fn extension_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    match segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => DEFAULT_IMAGE_EXTENSION.to_string(),
    }
}

/// Validate an uploaded file name and return its lowercase extension with a
/// leading dot.
pub fn validate_upload_filename(filename: &str) -> Result<String, CoreError> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| CoreError::Validation("Uploaded file has no extension".into()))?;

    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported image type '.{ext}'. Must be one of: {ALLOWED_UPLOAD_EXTENSIONS:?}"
        )));
    }

    Ok(format!(".{ext}"))
}

/// MIME type for a file name, by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        _ => "application/octet-stream",
    }
}
