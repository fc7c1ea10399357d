//! Request-facing deck operations.
//!
//! [`DeckService`] accepts new decks (dispatching one background run each),
//! answers record queries with the read-access rules applied, stores user
//! image uploads, and owns the shutdown of in-flight runs.

use std::sync::Arc;
use std::time::Duration;

use pitchdeck_core::deck::{DeckStatus, PitchDeckData};
use pitchdeck_core::error::CoreError;
use pitchdeck_core::images::{content_type_for, validate_upload_filename};
use pitchdeck_core::types::{DeckId, Timestamp, UserId};
use pitchdeck_db::models::deck::DeckRecord;
use pitchdeck_events::{ProgressSubscription, ProgressTracker};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::ServiceError;
use crate::orchestrator::{DeckJob, Pipeline};

/// Returned by [`DeckService::create`] before any step has run.
#[derive(Debug, Clone, Serialize)]
pub struct DeckHandle {
    pub deck_id: DeckId,
    pub user_id: UserId,
    pub name: String,
    pub status: DeckStatus,
    pub created_at: Timestamp,
}

/// A stored user image.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedImage {
    pub url: String,
    pub filename: String,
}

pub struct DeckService {
    pipeline: Arc<Pipeline>,
    tasks: TaskTracker,
    shutdown: CancellationToken,
}

impl DeckService {
    /// Runs dispatched by this service are cancelled when `shutdown` fires.
    pub fn new(pipeline: Pipeline, shutdown: CancellationToken) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tasks: TaskTracker::new(),
            shutdown,
        }
    }

    pub fn tracker(&self) -> &Arc<ProgressTracker> {
        self.pipeline.tracker()
    }

    /// Number of runs that have not finished yet.
    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Register a new deck and start its run in the background.
    ///
    /// `data` is expected to be normalized already. Returns as soon as the
    /// progress channel exists.
    pub async fn create(
        &self,
        data: PitchDeckData,
        owner: UserId,
    ) -> Result<DeckHandle, ServiceError> {
        if self.tasks.is_closed() {
            return Err(CoreError::Internal("Server is shutting down".into()).into());
        }

        let deck_id = uuid::Uuid::new_v4();
        let created_at = chrono::Utc::now();
        self.tracker()
            .create_channel(deck_id, owner.clone())
            .await?;

        let handle = DeckHandle {
            deck_id,
            user_id: owner.clone(),
            name: data.project_name.clone(),
            status: DeckStatus::Processing,
            created_at,
        };

        let job = DeckJob {
            deck_id,
            owner,
            data,
            created_at,
        };
        let pipeline = Arc::clone(&self.pipeline);
        let cancel = self.shutdown.child_token();
        self.tasks.spawn(async move { pipeline.run(job, cancel).await });

        tracing::info!(deck_id = %deck_id, user_id = %handle.user_id, "Deck accepted");
        Ok(handle)
    }

    /// Fetch a finished deck visible to `requester`: their own, or any
    /// public one.
    pub async fn get(&self, deck_id: DeckId, requester: &str) -> Result<DeckRecord, ServiceError> {
        let record = self
            .pipeline
            .collaborators()
            .repo
            .find_by_id(deck_id)
            .await?
            .filter(|d| d.readable_by(requester))
            .ok_or_else(|| CoreError::deck_not_found(deck_id))?;
        Ok(record)
    }

    /// Fetch a finished deck that anyone may view.
    pub async fn get_public(&self, deck_id: DeckId) -> Result<DeckRecord, ServiceError> {
        let record = self
            .pipeline
            .collaborators()
            .repo
            .find_by_id(deck_id)
            .await?
            .filter(|d| d.is_public)
            .ok_or_else(|| CoreError::deck_not_found(deck_id))?;
        Ok(record)
    }

    /// Decks owned by `user_id`, newest first.
    pub async fn list_user_decks(&self, user_id: &str) -> Result<Vec<DeckRecord>, ServiceError> {
        Ok(self.pipeline.collaborators().repo.list_by_user(user_id).await?)
    }

    /// Set the public flag of a deck owned by `user_id`.
    pub async fn update_visibility(
        &self,
        deck_id: DeckId,
        user_id: &str,
        is_public: bool,
    ) -> Result<DeckRecord, ServiceError> {
        let repo = &self.pipeline.collaborators().repo;
        let mut record = repo
            .find_by_id(deck_id)
            .await?
            .ok_or_else(|| CoreError::deck_not_found(deck_id))?;

        if record.user_id != user_id {
            return Err(CoreError::Forbidden("Only the owner can change deck visibility".into()).into());
        }

        repo.update_visibility(deck_id, is_public).await?;
        record.is_public = is_public;
        tracing::info!(deck_id = %deck_id, is_public, "Deck visibility updated");
        Ok(record)
    }

    /// Attach to the progress stream of an in-flight deck owned by
    /// `requester`.
    pub async fn subscribe(&self, deck_id: DeckId, requester: &str) -> Option<ProgressSubscription> {
        self.tracker().get_channel(deck_id, requester).await
    }

    /// Store an uploaded image under the media bucket.
    pub async fn upload_image(
        &self,
        user_id: &str,
        original_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ServiceError> {
        let ext = validate_upload_filename(original_name)?;
        if bytes.is_empty() {
            return Err(CoreError::Validation("Uploaded file is empty".into()).into());
        }

        let filename = format!("{}{ext}", uuid::Uuid::new_v4());
        let object_name = format!("uploads/{user_id}/{filename}");
        let url = self
            .pipeline
            .collaborators()
            .storage
            .upload_bytes(
                bytes,
                &self.pipeline.settings().media_bucket,
                &object_name,
                content_type_for(&filename),
            )
            .await?;

        tracing::info!(user_id, object = %object_name, "Image uploaded");
        Ok(UploadedImage { url, filename })
    }

    /// Stop accepting decks and cancel every in-flight run.
    ///
    /// Cancelled runs still emit their terminal event, so open progress
    /// streams end shortly after.
    pub fn cancel_all(&self) {
        self.tasks.close();
        self.shutdown.cancel();
    }

    /// [`cancel_all`](Self::cancel_all), then wait up to `grace` for the runs
    /// to finish. Returns `false` if the wait timed out.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.cancel_all();
        let drained = tokio::time::timeout(grace, self.tasks.wait()).await.is_ok();
        if drained {
            tracing::info!("All deck runs finished");
        } else {
            tracing::warn!(remaining = self.tasks.len(), "Deck runs still active after grace period");
        }
        drained
    }
}
