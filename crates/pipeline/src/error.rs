use std::fmt::Display;

use pitchdeck_core::error::CoreError;
use pitchdeck_db::DbError;
use pitchdeck_events::TrackerError;

use crate::storage::StorageError;

/// Why a deck run ended in `failed`.
///
/// The message is what the client sees in the terminal progress event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct StepError {
    pub message: String,
}

impl StepError {
    /// `"<context>: <err>"`.
    pub fn new(context: &str, err: impl Display) -> Self {
        Self {
            message: format!("{context}: {err}"),
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Adapter for `map_err`.
    pub fn context<E: Display>(context: &'static str) -> impl FnOnce(E) -> Self {
        move |err| Self::new(context, err)
    }
}

/// Errors from the request-facing [`crate::DeckService`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Record store error: {0}")]
    Db(#[from] DbError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Progress tracker error: {0}")]
    Tracker(#[from] TrackerError),
}
