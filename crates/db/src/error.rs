use pitchdeck_core::types::DeckId;

/// Errors from the record store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("Record store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The record store answered with a non-2xx status.
    #[error("Record store error ({status}): {body}")]
    Api { status: u16, body: String },

    /// An update targeted a row that does not exist.
    #[error("Deck {0} not found")]
    NotFound(DeckId),
}
