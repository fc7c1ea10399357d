//! Row model for the `pitch_decks` table.

use pitchdeck_core::deck::DeckStatus;
use pitchdeck_core::types::{DeckId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

/// A row from the `pitch_decks` table.
///
/// Written once per deck when its run ends: `completed` rows carry both
/// artifact URLs, `failed` rows carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecord {
    pub id: DeckId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub status: DeckStatus,
    pub created_at: Timestamp,
}

impl DeckRecord {
    /// A private, completed deck with both artifacts. `created_at` is the
    /// time the deck was submitted, not the time its run ended.
    pub fn completed(
        id: DeckId,
        user_id: UserId,
        name: String,
        pdf_url: String,
        html_url: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            pdf_url: Some(pdf_url),
            html_url: Some(html_url),
            is_public: false,
            status: DeckStatus::Completed,
            created_at,
        }
    }

    /// A private, failed deck without artifacts.
    pub fn failed(id: DeckId, user_id: UserId, name: String, created_at: Timestamp) -> Self {
        Self {
            id,
            user_id,
            name,
            pdf_url: None,
            html_url: None,
            is_public: false,
            status: DeckStatus::Failed,
            created_at,
        }
    }

    /// Whether `user_id` may read this deck.
    pub fn readable_by(&self, user_id: &str) -> bool {
        self.is_public || self.user_id == user_id
    }
}

/// DTO for `PATCH /api/v1/pitch-decks/{id}/visibility`.
#[derive(Debug, Deserialize)]
pub struct UpdateVisibility {
    #[serde(alias = "isPublic")]
    pub is_public: bool,
}
