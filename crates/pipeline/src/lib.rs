//! Deck generation pipeline.
//!
//! One background task per deck walks the step sequence in
//! [`pitchdeck_core::job_events::DeckStep`], talking to three swappable
//! collaborators ([`generator::ContentGenerator`], [`render::SlideRenderer`],
//! [`storage::ObjectStorage`]) and reporting every transition through the
//! shared [`pitchdeck_events::ProgressTracker`].

pub mod error;
pub mod generator;
pub mod images;
pub mod orchestrator;
pub mod render;
pub mod service;
pub mod settings;
pub mod storage;

pub use error::{ServiceError, StepError};
pub use orchestrator::{Collaborators, Pipeline};
pub use service::DeckService;
pub use settings::PipelineSettings;
