/// Decks are identified by random UUIDs generated at submission time.
pub type DeckId = uuid::Uuid;

/// Owner identity, as carried in the `sub` claim of the caller's token.
pub type UserId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
