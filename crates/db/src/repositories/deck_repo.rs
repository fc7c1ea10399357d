//! Repository for the `pitch_decks` table.
//!
//! The Supabase implementation goes through the PostgREST endpoint at
//! `<url>/rest/v1/pitch_decks` using the service-role key.

use async_trait::async_trait;
use pitchdeck_core::types::DeckId;
use reqwest::header::{HeaderValue, CONTENT_TYPE};

use crate::error::DbError;
use crate::models::deck::DeckRecord;
use crate::SupabaseConfig;

/// Table holding one row per finished deck.
const TABLE: &str = "pitch_decks";

/// Persistence operations on deck records.
#[async_trait]
pub trait DeckRepo: Send + Sync {
    async fn find_by_id(&self, id: DeckId) -> Result<Option<DeckRecord>, DbError>;

    /// Every deck owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DeckRecord>, DbError>;

    /// Insert the record, or replace the row with the same id.
    async fn save(&self, record: &DeckRecord) -> Result<(), DbError>;

    /// Set the public flag of an existing row.
    ///
    /// Returns [`DbError::NotFound`] if no row has this id.
    async fn update_visibility(&self, id: DeckId, is_public: bool) -> Result<(), DbError>;
}

/// [`DeckRepo`] backed by Supabase PostgREST.
pub struct SupabaseDeckRepo {
    client: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseDeckRepo {
    pub fn new(config: SupabaseConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: SupabaseConfig) -> Self {
        Self { client, config }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.config.url)
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url())
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DbError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(DbError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_rows(response: reqwest::Response) -> Result<Vec<DeckRecord>, DbError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Vec<DeckRecord>>().await?)
    }
}

#[async_trait]
impl DeckRepo for SupabaseDeckRepo {
    async fn find_by_id(&self, id: DeckId) -> Result<Option<DeckRecord>, DbError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .send()
            .await?;

        Ok(Self::parse_rows(response).await?.into_iter().next())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DeckRecord>, DbError> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("select", "*".to_string()),
                ("order", "created_at.desc".to_string()),
            ])
            .send()
            .await?;

        Self::parse_rows(response).await
    }

    async fn save(&self, record: &DeckRecord) -> Result<(), DbError> {
        let response = self
            .request(reqwest::Method::POST)
            .header(
                "Prefer",
                HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
            )
            .json(record)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        tracing::debug!(deck_id = %record.id, status = %record.status, "Deck record saved");
        Ok(())
    }

    async fn update_visibility(&self, id: DeckId, is_public: bool) -> Result<(), DbError> {
        let response = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", format!("eq.{id}"))])
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", HeaderValue::from_static("return=representation"))
            .json(&serde_json::json!({ "is_public": is_public }))
            .send()
            .await?;

        if Self::parse_rows(response).await?.is_empty() {
            return Err(DbError::NotFound(id));
        }
        Ok(())
    }
}
