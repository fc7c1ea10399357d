use std::sync::Arc;

use pitchdeck_pipeline::DeckService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Deck operations, including the progress tracker of in-flight decks.
    pub decks: Arc<DeckService>,
}
