//! Deck record persistence.
//!
//! Completed and failed decks are stored as rows of the `pitch_decks`
//! table. [`repositories::SupabaseDeckRepo`] talks to a Supabase PostgREST
//! endpoint; [`repositories::InMemoryDeckRepo`] keeps rows in process for
//! local runs and tests.

pub mod error;
pub mod models;
pub mod repositories;

pub use error::DbError;

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co` (no trailing slash).
    pub url: String,
    /// Service-role key, sent both as `apikey` and as the bearer token.
    pub service_key: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        }
    }
}
