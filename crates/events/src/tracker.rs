use std::collections::HashMap;
use std::sync::Arc;

use futures::Stream;
use pitchdeck_core::job_events::{ProgressUpdate, PROGRESS_CHANNEL_CAPACITY};
use pitchdeck_core::types::{DeckId, UserId};
use tokio::sync::{mpsc, Mutex, RwLock};

/// Receiving half shared by every subscriber of one deck.
///
/// Each buffered event is handed to exactly one reader.
type SharedReceiver = Arc<Mutex<mpsc::Receiver<String>>>;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Progress channel for deck {0} already exists")]
    AlreadyRegistered(DeckId),

    #[error("No progress channel for deck {0}")]
    NotFound(DeckId),

    #[error("Progress channel for deck {0} is full")]
    Backlogged(DeckId),

    #[error("Progress channel for deck {0} has no receiver")]
    Closed(DeckId),

    #[error("Failed to serialize progress update: {0}")]
    Serialize(#[from] serde_json::Error),
}

struct ProgressChannel {
    sender: mpsc::Sender<String>,
    receiver: SharedReceiver,
}

/// Both maps live behind a single lock so a deck is always either fully
/// registered (channel and owner) or not registered at all.
#[derive(Default)]
struct Registry {
    channels: HashMap<DeckId, ProgressChannel>,
    owners: HashMap<DeckId, UserId>,
}

/// Registry of in-flight decks and their progress channels.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared between the orchestrator and the HTTP layer.
pub struct ProgressTracker {
    registry: RwLock<Registry>,
    capacity: usize,
}

/// A reader attached to one deck's progress channel.
///
/// Yields serialized [`ProgressUpdate`] payloads in the order they were
/// sent. Once the channel is closed, buffered payloads are still delivered
/// and then [`recv`](Self::recv) returns `None`.
#[derive(Debug)]
pub struct ProgressSubscription {
    deck_id: DeckId,
    receiver: SharedReceiver,
}

impl ProgressSubscription {
    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    /// Wait for the next payload, or `None` once the channel is closed and
    /// drained.
    pub async fn recv(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }

    /// Turn the subscription into a stream of payloads.
    pub fn into_stream(self) -> impl Stream<Item = String> + Send + 'static {
        futures::stream::unfold(self, |sub| async move {
            let next = sub.recv().await?;
            Some((next, sub))
        })
    }
}

impl ProgressTracker {
    /// Create an empty tracker with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(PROGRESS_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            capacity: capacity.max(1),
        }
    }

    /// Register a channel for `deck_id` owned by `owner`.
    ///
    /// Fails if the deck is already registered. The returned subscription
    /// may be dropped; readers attach later through [`get_channel`](Self::get_channel).
    pub async fn create_channel(
        &self,
        deck_id: DeckId,
        owner: UserId,
    ) -> Result<ProgressSubscription, TrackerError> {
        let mut registry = self.registry.write().await;
        if registry.channels.contains_key(&deck_id) {
            return Err(TrackerError::AlreadyRegistered(deck_id));
        }

        let (sender, receiver) = mpsc::channel(self.capacity);
        let receiver = Arc::new(Mutex::new(receiver));
        registry.channels.insert(
            deck_id,
            ProgressChannel {
                sender,
                receiver: Arc::clone(&receiver),
            },
        );
        registry.owners.insert(deck_id, owner);
        tracing::debug!(%deck_id, "Progress channel created");

        Ok(ProgressSubscription { deck_id, receiver })
    }

    /// Attach to the channel of `deck_id` if `requester` owns it.
    ///
    /// Returns `None` both for an unknown deck and for a foreign one, so a
    /// caller cannot probe which decks are in flight.
    pub async fn get_channel(
        &self,
        deck_id: DeckId,
        requester: &str,
    ) -> Option<ProgressSubscription> {
        let registry = self.registry.read().await;
        let channel = registry.channels.get(&deck_id)?;
        match registry.owners.get(&deck_id) {
            Some(owner) if owner == requester => Some(ProgressSubscription {
                deck_id,
                receiver: Arc::clone(&channel.receiver),
            }),
            _ => {
                tracing::debug!(%deck_id, "Progress channel requested by non-owner");
                None
            }
        }
    }

    /// Enqueue one update for `deck_id`.
    ///
    /// The registry lock is released before the payload is enqueued, and the
    /// enqueue never waits: a full buffer is reported as
    /// [`TrackerError::Backlogged`].
    pub async fn send_update(
        &self,
        deck_id: DeckId,
        update: &ProgressUpdate,
    ) -> Result<(), TrackerError> {
        let sender = {
            let registry = self.registry.read().await;
            registry
                .channels
                .get(&deck_id)
                .map(|c| c.sender.clone())
                .ok_or(TrackerError::NotFound(deck_id))?
        };

        let payload = serde_json::to_string(update)?;
        sender.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TrackerError::Backlogged(deck_id),
            mpsc::error::TrySendError::Closed(_) => TrackerError::Closed(deck_id),
        })
    }

    /// Unregister `deck_id` and close its channel.
    ///
    /// Subscribers drain whatever is still buffered and then observe the end
    /// of the stream. Closing an unregistered deck is an error.
    pub async fn close_channel(&self, deck_id: DeckId) -> Result<(), TrackerError> {
        let mut registry = self.registry.write().await;
        let channel = registry
            .channels
            .remove(&deck_id)
            .ok_or(TrackerError::NotFound(deck_id))?;
        registry.owners.remove(&deck_id);
        drop(channel);
        tracing::debug!(%deck_id, "Progress channel closed");
        Ok(())
    }

    /// Whether `deck_id` currently has an open channel.
    pub async fn is_registered(&self, deck_id: DeckId) -> bool {
        self.registry.read().await.channels.contains_key(&deck_id)
    }

    /// Number of decks with an open channel.
    pub async fn in_flight_count(&self) -> usize {
        self.registry.read().await.channels.len()
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
