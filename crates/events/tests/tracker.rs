//! Unit tests for `ProgressTracker`.
//!
//! These exercise the registry and channel semantics directly: owner checks,
//! ordering, closing, and the error cases of sending or closing twice.

use assert_matches::assert_matches;
use futures::StreamExt;
use pitchdeck_core::job_events::{DeckStep, ProgressUpdate};
use pitchdeck_events::{ProgressTracker, TrackerError};
use uuid::Uuid;

fn decode(payload: &str) -> ProgressUpdate {
    serde_json::from_str(payload).expect("payload should be a ProgressUpdate")
}

// ---------------------------------------------------------------------------
// Test: a new tracker has no channels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_tracker_is_empty() {
    let tracker = ProgressTracker::new();
    assert_eq!(tracker.in_flight_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: only the owner can attach to a channel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_channel_checks_owner() {
    let tracker = ProgressTracker::new();
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();

    assert!(tracker.get_channel(deck, "u1").await.is_some());
    assert!(tracker.get_channel(deck, "u2").await.is_none());
    assert!(tracker.get_channel(Uuid::new_v4(), "u1").await.is_none());
}

// ---------------------------------------------------------------------------
// Test: registering the same deck twice is rejected
// ---------------------------------------------------------------------------

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let tracker = ProgressTracker::new();
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();

    assert_matches!(
        tracker.create_channel(deck, "u2".into()).await,
        Err(TrackerError::AlreadyRegistered(id)) if id == deck
    );
    // The original owner is untouched.
    assert!(tracker.get_channel(deck, "u1").await.is_some());
}

// ---------------------------------------------------------------------------
// Test: updates arrive in send order, buffered ones survive close
// ---------------------------------------------------------------------------

#[tokio::test]
async fn updates_are_delivered_in_order_then_stream_ends() {
    let tracker = ProgressTracker::new();
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();
    let sub = tracker.get_channel(deck, "u1").await.unwrap();

    tracker
        .send_update(deck, &ProgressUpdate::processing(DeckStep::Initializing))
        .await
        .unwrap();
    tracker
        .send_update(deck, &ProgressUpdate::processing(DeckStep::ProcessingImages))
        .await
        .unwrap();
    tracker
        .send_update(deck, &ProgressUpdate::completed("pdf", "html"))
        .await
        .unwrap();
    tracker.close_channel(deck).await.unwrap();

    let events: Vec<ProgressUpdate> = sub.into_stream().map(|p| decode(&p)).collect().await;
    let steps: Vec<u32> = events.iter().map(|e| e.current_step).collect();
    assert_eq!(steps, vec![0, 1, 7]);
    assert!(events.last().unwrap().is_terminal());
}

// ---------------------------------------------------------------------------
// Test: closing unregisters the deck
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_channel_is_no_longer_found() {
    let tracker = ProgressTracker::new();
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();
    assert_eq!(tracker.in_flight_count().await, 1);

    tracker.close_channel(deck).await.unwrap();

    assert!(tracker.get_channel(deck, "u1").await.is_none());
    assert!(!tracker.is_registered(deck).await);
    assert_eq!(tracker.in_flight_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: send and close after close are errors, not panics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn send_and_close_after_close_fail() {
    let tracker = ProgressTracker::new();
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();
    tracker.close_channel(deck).await.unwrap();

    assert_matches!(
        tracker
            .send_update(deck, &ProgressUpdate::processing(DeckStep::Initializing))
            .await,
        Err(TrackerError::NotFound(_))
    );
    assert_matches!(
        tracker.close_channel(deck).await,
        Err(TrackerError::NotFound(_))
    );
}

// ---------------------------------------------------------------------------
// Test: a subscriber waiting on an empty channel wakes up on close
// ---------------------------------------------------------------------------

#[tokio::test]
async fn waiting_subscriber_sees_end_of_stream_on_close() {
    let tracker = std::sync::Arc::new(ProgressTracker::new());
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();
    let sub = tracker.get_channel(deck, "u1").await.unwrap();

    let reader = tokio::spawn(async move { sub.recv().await });
    tokio::task::yield_now().await;
    tracker.close_channel(deck).await.unwrap();

    let got = tokio::time::timeout(std::time::Duration::from_secs(2), reader)
        .await
        .expect("reader should finish")
        .unwrap();
    assert!(got.is_none());
}

// ---------------------------------------------------------------------------
// Test: a full buffer is reported instead of blocking the producer
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_buffer_is_reported() {
    let tracker = ProgressTracker::with_capacity(1);
    let deck = Uuid::new_v4();
    tracker.create_channel(deck, "u1".into()).await.unwrap();

    let update = ProgressUpdate::processing(DeckStep::Initializing);
    tracker.send_update(deck, &update).await.unwrap();
    assert_matches!(
        tracker.send_update(deck, &update).await,
        Err(TrackerError::Backlogged(_))
    );
}

// ---------------------------------------------------------------------------
// Test: channels of different decks are independent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn channels_are_independent() {
    let tracker = ProgressTracker::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    tracker.create_channel(a, "u1".into()).await.unwrap();
    tracker.create_channel(b, "u2".into()).await.unwrap();

    tracker
        .send_update(b, &ProgressUpdate::failed(DeckStep::GeneratingContent, "boom"))
        .await
        .unwrap();
    tracker.close_channel(b).await.unwrap();

    assert!(tracker.is_registered(a).await);
    assert!(tracker.get_channel(b, "u2").await.is_none());
    assert!(tracker.get_channel(a, "u1").await.is_some());
}
