//! Process-local record store used when no Supabase project is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use pitchdeck_core::types::DeckId;
use tokio::sync::RwLock;

use super::deck_repo::DeckRepo;
use crate::error::DbError;
use crate::models::deck::DeckRecord;

/// Keeps deck rows in a map for the lifetime of the process.
#[derive(Default)]
pub struct InMemoryDeckRepo {
    rows: RwLock<HashMap<DeckId, DeckRecord>>,
}

impl InMemoryDeckRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeckRepo for InMemoryDeckRepo {
    async fn find_by_id(&self, id: DeckId) -> Result<Option<DeckRecord>, DbError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DeckRecord>, DbError> {
        let mut decks: Vec<DeckRecord> = self
            .rows
            .read()
            .await
            .values()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        decks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(decks)
    }

    async fn save(&self, record: &DeckRecord) -> Result<(), DbError> {
        self.rows.write().await.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_visibility(&self, id: DeckId, is_public: bool) -> Result<(), DbError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id).ok_or(DbError::NotFound(id))?;
        row.is_public = is_public;
        Ok(())
    }
}
