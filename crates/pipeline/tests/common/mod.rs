#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use pitchdeck_core::deck::{DeckStatus, PitchDeckData};
use pitchdeck_core::job_events::ProgressUpdate;
use pitchdeck_core::types::DeckId;
use pitchdeck_db::models::deck::DeckRecord;
use pitchdeck_db::repositories::{DeckRepo, InMemoryDeckRepo};
use pitchdeck_db::DbError;
use pitchdeck_events::{ProgressSubscription, ProgressTracker};
use pitchdeck_pipeline::generator::{ContentGenerator, GenerationError, GenerationRequest};
use pitchdeck_pipeline::render::{RenderError, RenderFormat, SlideRenderer};
use pitchdeck_pipeline::storage::{LocalStorage, ObjectStorage, StorageError};
use pitchdeck_pipeline::{Collaborators, DeckService, Pipeline, PipelineSettings};
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

pub const MARKUP: &str = "---\nmarp: true\n---\n# Acme";

// ---------------------------------------------------------------------------
// Fake collaborators
// ---------------------------------------------------------------------------

/// Content generator that waits for a permit on its gate, then answers.
pub struct FakeGenerator {
    pub gate: Arc<Semaphore>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    /// Starts closed: nothing is generated until [`release`](Self::release).
    pub fn gated() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::gated()
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1_000);
    }
}

#[async_trait]
impl ContentGenerator for FakeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let _permit = self.gate.acquire().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(request.prompt.contains("Project Name:"));
        if self.fail {
            return Err(GenerationError::Api {
                status: 429,
                body: "quota exceeded".into(),
            });
        }
        Ok(MARKUP.to_string())
    }
}

/// What the fake renderer does for a given format.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum RenderBehaviour {
    Succeed,
    Fail,
    Hang,
}

pub struct FakeRenderer {
    pub pdf: RenderBehaviour,
    pub html: RenderBehaviour,
}

impl FakeRenderer {
    pub fn ok() -> Self {
        Self {
            pdf: RenderBehaviour::Succeed,
            html: RenderBehaviour::Succeed,
        }
    }
}

#[async_trait]
impl SlideRenderer for FakeRenderer {
    async fn render(
        &self,
        markdown: &Path,
        output: &Path,
        format: RenderFormat,
        _theme: &str,
    ) -> Result<(), RenderError> {
        let behaviour = match format {
            RenderFormat::Pdf => self.pdf,
            RenderFormat::Html => self.html,
        };
        match behaviour {
            RenderBehaviour::Succeed => {
                let source = tokio::fs::read_to_string(markdown).await?;
                tokio::fs::write(output, format!("{}:{source}", format.extension())).await?;
                Ok(())
            }
            RenderBehaviour::Fail => Err(RenderError::ExecutionFailed {
                exit_code: Some(1),
                stderr: "marp exploded".into(),
            }),
            RenderBehaviour::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

/// Storage whose every call is refused by the remote end.
pub struct OfflineStorage;

#[async_trait]
impl ObjectStorage for OfflineStorage {
    async fn upload_bytes(
        &self,
        _bytes: Vec<u8>,
        _bucket: &str,
        _remote_name: &str,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        Err(StorageError::Api {
            status: 503,
            body: "bucket offline".into(),
        })
    }

    async fn download_file(&self, _url: &str, _dest: &Path) -> Result<(), StorageError> {
        Err(StorageError::Api {
            status: 503,
            body: "bucket offline".into(),
        })
    }
}

/// Wraps the in-memory store but refuses to save completed decks.
/// Failed records still go through.
pub struct CompletedSavesRejected(pub Arc<InMemoryDeckRepo>);

#[async_trait]
impl DeckRepo for CompletedSavesRejected {
    async fn find_by_id(&self, id: DeckId) -> Result<Option<DeckRecord>, DbError> {
        self.0.find_by_id(id).await
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DeckRecord>, DbError> {
        self.0.list_by_user(user_id).await
    }

    async fn save(&self, record: &DeckRecord) -> Result<(), DbError> {
        if record.status == DeckStatus::Completed {
            return Err(DbError::Api {
                status: 500,
                body: "disk full".into(),
            });
        }
        self.0.save(record).await
    }

    async fn update_visibility(&self, id: DeckId, is_public: bool) -> Result<(), DbError> {
        self.0.update_visibility(id, is_public).await
    }
}

/// Collaborator faults to inject into a [`Harness`].
#[derive(Default, Clone, Copy)]
pub struct Faults {
    pub storage_offline: bool,
    pub reject_completed_saves: bool,
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub service: DeckService,
    pub generator: Arc<FakeGenerator>,
    pub repo: Arc<InMemoryDeckRepo>,
    pub tracker: Arc<ProgressTracker>,
    pub dir: TempDir,
}

impl Harness {
    pub fn work_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("work")
    }

    pub fn store_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }
}

pub fn harness(generator: FakeGenerator, renderer: FakeRenderer) -> Harness {
    harness_with(generator, renderer, Duration::from_secs(30))
}

pub fn harness_with(
    generator: FakeGenerator,
    renderer: FakeRenderer,
    max_job_duration: Duration,
) -> Harness {
    build(generator, renderer, max_job_duration, Faults::default())
}

pub fn harness_with_faults(
    generator: FakeGenerator,
    renderer: FakeRenderer,
    faults: Faults,
) -> Harness {
    build(generator, renderer, Duration::from_secs(30), faults)
}

fn build(
    generator: FakeGenerator,
    renderer: FakeRenderer,
    max_job_duration: Duration,
    faults: Faults,
) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = PipelineSettings {
        work_dir: dir.path().join("work"),
        uploads_dir: dir.path().join("uploads"),
        max_job_duration,
        ..Default::default()
    };

    let tracker = Arc::new(ProgressTracker::new());
    let repo = Arc::new(InMemoryDeckRepo::new());
    let generator = Arc::new(generator);
    let stored: Arc<dyn DeckRepo> = if faults.reject_completed_saves {
        Arc::new(CompletedSavesRejected(repo.clone()))
    } else {
        repo.clone()
    };
    let storage: Arc<dyn ObjectStorage> = if faults.storage_offline {
        Arc::new(OfflineStorage)
    } else {
        Arc::new(LocalStorage::new(dir.path().join("uploads"), "/uploads"))
    };
    let collaborators = Collaborators {
        repo: stored,
        generator: generator.clone(),
        renderer: Arc::new(renderer),
        storage,
    };
    let pipeline = Pipeline::new(tracker.clone(), collaborators, settings);
    let service = DeckService::new(pipeline, CancellationToken::new());

    Harness {
        service,
        generator,
        repo,
        tracker,
        dir,
    }
}

pub fn sample_deck() -> PitchDeckData {
    let mut data = PitchDeckData {
        project_name: "Acme Rockets".into(),
        big_idea: "Reusable rockets for small payloads".into(),
        ..Default::default()
    };
    data.normalize().expect("valid deck");
    data
}

/// Drain a subscription to its end.
pub async fn collect(sub: ProgressSubscription) -> Vec<ProgressUpdate> {
    let events = sub
        .into_stream()
        .map(|payload| serde_json::from_str::<ProgressUpdate>(&payload).expect("valid event"))
        .collect::<Vec<_>>();
    tokio::time::timeout(Duration::from_secs(10), events)
        .await
        .expect("progress stream should end")
}

pub fn steps(events: &[ProgressUpdate]) -> Vec<u32> {
    events.iter().map(|e| e.current_step).collect()
}
