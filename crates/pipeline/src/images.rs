//! Image acquisition for one deck.
//!
//! Each submitted reference ends up as a path the render tool can resolve
//! from inside the job directory. A reference that cannot be fetched is
//! dropped from the deck with a warning.

use std::path::{Component, Path, PathBuf};

use pitchdeck_core::deck::PitchDeckData;
use pitchdeck_core::images::{classify_image_ref, extension_from_url, ImageKind, ImageSource};
use pitchdeck_core::prompt::DeckImages;

use crate::storage::ObjectStorage;

/// Resolve the logo, team photo and diagram references of `data`.
pub async fn acquire_images(
    storage: &dyn ObjectStorage,
    data: &PitchDeckData,
    job_dir: &Path,
    uploads_dir: &Path,
) -> DeckImages {
    let mut images = DeckImages::default();
    for kind in ImageKind::ALL {
        let (reference, slot) = match kind {
            ImageKind::Logo => (&data.company_logo, &mut images.logo),
            ImageKind::TeamPhoto => (&data.team_photo, &mut images.team_photo),
            ImageKind::Diagram => (&data.diagram, &mut images.diagram),
        };
        *slot = acquire_one(storage, kind, reference, job_dir, uploads_dir).await;
    }
    images
}

async fn acquire_one(
    storage: &dyn ObjectStorage,
    kind: ImageKind,
    reference: &str,
    job_dir: &Path,
    uploads_dir: &Path,
) -> Option<String> {
    match classify_image_ref(reference) {
        ImageSource::Empty => None,
        ImageSource::Verbatim(value) => Some(value.to_string()),
        ImageSource::Remote(url) => {
            let file_name = format!("{}{}", kind.file_stem(), extension_from_url(url));
            match storage.download_file(url, &job_dir.join(&file_name)).await {
                Ok(()) => Some(file_name),
                Err(e) => {
                    tracing::warn!(image = kind.file_stem(), url, error = %e, "Image download failed, omitting");
                    None
                }
            }
        }
        ImageSource::LocalUpload(rel) => {
            let Some(src) = join_within(uploads_dir, rel) else {
                tracing::warn!(image = kind.file_stem(), path = rel, "Rejected upload path, omitting");
                return None;
            };
            let file_name = format!("{}{}", kind.file_stem(), extension_from_url(rel));
            match tokio::fs::copy(&src, job_dir.join(&file_name)).await {
                Ok(_) => Some(file_name),
                Err(e) => {
                    tracing::warn!(image = kind.file_stem(), path = %src.display(), error = %e, "Uploaded image unavailable, omitting");
                    None
                }
            }
        }
    }
}

/// `root/rel`, provided `rel` only contains normal path segments.
fn join_within(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = Path::new(rel);
    let normal = rel.components().all(|c| matches!(c, Component::Normal(_)));
    (normal && rel.components().next().is_some()).then(|| root.join(rel))
}
