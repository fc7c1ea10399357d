//! Repository layer.
//!
//! [`DeckRepo`] is the persistence seam used by the pipeline and the HTTP
//! layer. Implementations are shared behind `Arc<dyn DeckRepo>`.

pub mod deck_repo;
pub mod memory_deck_repo;

pub use deck_repo::{DeckRepo, SupabaseDeckRepo};
pub use memory_deck_repo::InMemoryDeckRepo;
