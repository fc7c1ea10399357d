//! Progress events streamed to clients while a deck is generated.
//!
//! A run walks [`DeckStep::ALL`] in order, announcing each step with a
//! `processing` event *before* attempting it, then ends with exactly one
//! `completed` or `failed` event.

use serde::{Deserialize, Serialize};

use crate::deck::DeckStatus;

/// One step of the generation pipeline. The discriminant is the step index
/// reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeckStep {
    Initializing = 0,
    ProcessingImages = 1,
    GeneratingContent = 2,
    SavingMarkup = 3,
    ConvertingPdf = 4,
    ConvertingHtml = 5,
    Uploading = 6,
}

impl DeckStep {
    /// Every step, in execution order.
    pub const ALL: [DeckStep; 7] = [
        Self::Initializing,
        Self::ProcessingImages,
        Self::GeneratingContent,
        Self::SavingMarkup,
        Self::ConvertingPdf,
        Self::ConvertingHtml,
        Self::Uploading,
    ];

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Client-facing message announcing the step.
    pub fn message(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing generation...",
            Self::ProcessingImages => "Processing images...",
            Self::GeneratingContent => "Generating content...",
            Self::SavingMarkup => "Saving slide markup...",
            Self::ConvertingPdf => "Converting to PDF...",
            Self::ConvertingHtml => "Converting to HTML...",
            Self::Uploading => "Uploading files...",
        }
    }

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Step index carried by the `completed` event: one past the last step.
pub const COMPLETED_STEP: u32 = DeckStep::ALL.len() as u32;

/// Enough buffer to hold a whole run (every step plus the terminal event)
/// without blocking the producer.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 10;

/// Message of the terminal success event.
pub const MSG_COMPLETED: &str = "Generation completed";

/// A single reported state transition for a deck.
///
/// Serialized as the `data` of one server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub status: DeckStatus,
    pub current_step: u32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
}

impl ProgressUpdate {
    /// Announce that `step` is about to run.
    pub fn processing(step: DeckStep) -> Self {
        Self {
            status: DeckStatus::Processing,
            current_step: step.index(),
            message: step.message().to_string(),
            download_url: None,
            view_url: None,
        }
    }

    /// Terminal success carrying both artifact references.
    pub fn completed(download_url: impl Into<String>, view_url: impl Into<String>) -> Self {
        Self {
            status: DeckStatus::Completed,
            current_step: COMPLETED_STEP,
            message: MSG_COMPLETED.to_string(),
            download_url: Some(download_url.into()),
            view_url: Some(view_url.into()),
        }
    }

    /// Terminal failure at `step` with a diagnostic message.
    pub fn failed(step: DeckStep, message: impl Into<String>) -> Self {
        Self {
            status: DeckStatus::Failed,
            current_step: step.index(),
            message: message.into(),
            download_url: None,
            view_url: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
