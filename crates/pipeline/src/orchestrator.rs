//! The per-deck step run.
//!
//! [`Pipeline::run`] walks every [`DeckStep`] in order, announcing each one
//! before attempting it. The run ends with exactly one terminal event, after
//! which the deck's progress channel is closed and its working directory
//! removed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use pitchdeck_core::deck::PitchDeckData;
use pitchdeck_core::job_events::{DeckStep, ProgressUpdate};
use pitchdeck_core::types::{DeckId, Timestamp, UserId};
use pitchdeck_db::models::deck::DeckRecord;
use pitchdeck_db::repositories::DeckRepo;
use pitchdeck_events::ProgressTracker;
use tokio_util::sync::CancellationToken;

use crate::error::StepError;
use crate::generator::{ContentGenerator, GenerationRequest};
use crate::images::acquire_images;
use crate::render::{RenderFormat, SlideRenderer};
use crate::settings::PipelineSettings;
use crate::storage::ObjectStorage;

/// Name of the generated markup inside the job directory.
pub const MARKDOWN_FILE: &str = "presentation.md";

/// External services a run depends on.
#[derive(Clone)]
pub struct Collaborators {
    pub repo: Arc<dyn DeckRepo>,
    pub generator: Arc<dyn ContentGenerator>,
    pub renderer: Arc<dyn SlideRenderer>,
    pub storage: Arc<dyn ObjectStorage>,
}

/// One accepted deck request.
#[derive(Debug, Clone)]
pub struct DeckJob {
    pub deck_id: DeckId,
    pub owner: UserId,
    pub data: PitchDeckData,
    /// Submission time; stored on the deck's record whatever the outcome.
    pub created_at: Timestamp,
}

/// Public URLs of the uploaded artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub pdf_url: String,
    pub html_url: String,
}

/// Shared, immutable context for deck runs.
pub struct Pipeline {
    tracker: Arc<ProgressTracker>,
    collaborators: Collaborators,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        tracker: Arc<ProgressTracker>,
        collaborators: Collaborators,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            tracker,
            collaborators,
            settings,
        }
    }

    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        &self.tracker
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Working directory of one deck.
    pub fn job_dir(&self, deck_id: DeckId) -> PathBuf {
        self.settings.work_dir.join(deck_id.to_string())
    }

    /// Run `job` to its terminal event.
    ///
    /// The deck's progress channel must already be registered. The run stops
    /// early, as a failure, when `cancel` fires or the maximum job duration
    /// elapses; the collaborator call in flight at that moment is dropped.
    pub async fn run(&self, job: DeckJob, cancel: CancellationToken) {
        let deck_id = job.deck_id;
        let job_dir = self.job_dir(deck_id);
        let current = AtomicU32::new(DeckStep::Initializing.index());
        let max = self.settings.max_job_duration;

        tracing::info!(deck_id = %deck_id, user_id = %job.owner, "Deck generation started");

        let outcome = tokio::select! {
            res = self.run_steps(&job, &job_dir, &current) => res,
            _ = tokio::time::sleep(max) => Err(StepError::msg(format!(
                "Deck generation timed out after {}s",
                max.as_secs()
            ))),
            _ = cancel.cancelled() => Err(StepError::msg("Deck generation cancelled")),
        };

        match outcome {
            Ok(artifacts) => {
                tracing::info!(deck_id = %deck_id, "Deck generation completed");
                self.emit(
                    deck_id,
                    ProgressUpdate::completed(artifacts.pdf_url, artifacts.html_url),
                )
                .await;
            }
            Err(err) => {
                let step = DeckStep::from_index(current.load(Ordering::Acquire))
                    .unwrap_or(DeckStep::Initializing);
                tracing::error!(
                    deck_id = %deck_id,
                    step = step.index(),
                    error = %err,
                    "Deck generation failed",
                );
                self.emit(deck_id, ProgressUpdate::failed(step, err.message))
                    .await;
                self.persist_failure(&job).await;
            }
        }

        self.remove_job_dir(&job_dir).await;
        if let Err(e) = self.tracker.close_channel(deck_id).await {
            tracing::warn!(deck_id = %deck_id, error = %e, "Failed to close progress channel");
        }
    }

    async fn run_steps(
        &self,
        job: &DeckJob,
        job_dir: &Path,
        current: &AtomicU32,
    ) -> Result<Artifacts, StepError> {
        let c = &self.collaborators;
        let deck_id = job.deck_id;

        self.enter(deck_id, DeckStep::Initializing, current).await;
        tokio::fs::create_dir_all(job_dir)
            .await
            .map_err(StepError::context("Failed to create working directory"))?;

        self.enter(deck_id, DeckStep::ProcessingImages, current).await;
        let images = acquire_images(
            c.storage.as_ref(),
            &job.data,
            job_dir,
            &self.settings.uploads_dir,
        )
        .await;

        self.enter(deck_id, DeckStep::GeneratingContent, current).await;
        let request = GenerationRequest::for_deck(&job.data, images);
        let markdown = c
            .generator
            .generate(&request)
            .await
            .map_err(StepError::context("Failed to generate content"))?;

        self.enter(deck_id, DeckStep::SavingMarkup, current).await;
        let md_path = job_dir.join(MARKDOWN_FILE);
        tokio::fs::write(&md_path, markdown.as_bytes())
            .await
            .map_err(StepError::context("Failed to save markdown"))?;

        self.enter(deck_id, DeckStep::ConvertingPdf, current).await;
        let pdf_name = artifact_name(deck_id, RenderFormat::Pdf);
        let pdf_path = job_dir.join(&pdf_name);
        c.renderer
            .render(&md_path, &pdf_path, RenderFormat::Pdf, &job.data.theme)
            .await
            .map_err(StepError::context("Failed to convert to PDF"))?;

        self.enter(deck_id, DeckStep::ConvertingHtml, current).await;
        let html_name = artifact_name(deck_id, RenderFormat::Html);
        let html_path = job_dir.join(&html_name);
        c.renderer
            .render(&md_path, &html_path, RenderFormat::Html, &job.data.theme)
            .await
            .map_err(StepError::context("Failed to convert to HTML"))?;

        self.enter(deck_id, DeckStep::Uploading, current).await;
        let bucket = &self.settings.deck_bucket;
        let pdf_url = c
            .storage
            .upload_file(&pdf_path, bucket, &pdf_name)
            .await
            .map_err(StepError::context("Failed to upload PDF"))?;
        let html_url = c
            .storage
            .upload_file(&html_path, bucket, &html_name)
            .await
            .map_err(StepError::context("Failed to upload HTML"))?;

        let record = DeckRecord::completed(
            deck_id,
            job.owner.clone(),
            job.data.project_name.clone(),
            pdf_url.clone(),
            html_url.clone(),
            job.created_at,
        );
        c.repo
            .save(&record)
            .await
            .map_err(StepError::context("Failed to save deck record"))?;

        Ok(Artifacts { pdf_url, html_url })
    }

    /// Record `step` as current and announce it.
    async fn enter(&self, deck_id: DeckId, step: DeckStep, current: &AtomicU32) {
        current.store(step.index(), Ordering::Release);
        tracing::debug!(deck_id = %deck_id, step = step.index(), "{}", step.message());
        self.emit(deck_id, ProgressUpdate::processing(step)).await;
    }

    async fn emit(&self, deck_id: DeckId, update: ProgressUpdate) {
        if let Err(e) = self.tracker.send_update(deck_id, &update).await {
            tracing::warn!(deck_id = %deck_id, error = %e, "Failed to send progress update");
        }
    }

    async fn persist_failure(&self, job: &DeckJob) {
        let record = DeckRecord::failed(
            job.deck_id,
            job.owner.clone(),
            job.data.project_name.clone(),
            job.created_at,
        );
        if let Err(e) = self.collaborators.repo.save(&record).await {
            tracing::error!(deck_id = %job.deck_id, error = %e, "Failed to persist failed deck");
        }
    }

    async fn remove_job_dir(&self, job_dir: &Path) {
        match tokio::fs::remove_dir_all(job_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %job_dir.display(), error = %e, "Failed to remove working directory");
            }
        }
    }
}

/// `<deck>.pdf` / `<deck>.html`.
pub fn artifact_name(deck_id: DeckId, format: RenderFormat) -> String {
    format!("{deck_id}.{}", format.extension())
}
