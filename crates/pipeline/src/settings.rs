use std::path::PathBuf;
use std::time::Duration;

/// Default maximum run time of one deck.
pub const DEFAULT_MAX_JOB_DURATION: Duration = Duration::from_secs(600);

/// File system layout, bucket names and limits used by the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Parent of the per-deck working directories.
    pub work_dir: PathBuf,
    /// Directory holding images stored by the local upload fallback.
    pub uploads_dir: PathBuf,
    /// Bucket receiving the rendered artifacts.
    pub deck_bucket: String,
    /// Bucket receiving user image uploads.
    pub media_bucket: String,
    pub max_job_duration: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp"),
            uploads_dir: PathBuf::from("uploads"),
            deck_bucket: "pitch-decks".to_string(),
            media_bucket: "user-media".to_string(),
            max_job_duration: DEFAULT_MAX_JOB_DURATION,
        }
    }
}
