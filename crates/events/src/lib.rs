//! Per-deck progress channels.
//!
//! [`ProgressTracker`] owns one bounded queue and one owner record per
//! in-flight deck. The orchestrating task is the sole producer; HTTP
//! progress streams subscribe through an owner-checked lookup.

pub mod tracker;

pub use tracker::{ProgressSubscription, ProgressTracker, TrackerError};
