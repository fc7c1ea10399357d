//! Pitch deck domain types.
//!
//! Everything here is pure data and string handling: the deck input model,
//! job status and progress events, the step sequence, theme rules, prompt
//! assembly, and upload validation. No I/O lives in this crate.

pub mod deck;
pub mod error;
pub mod images;
pub mod job_events;
pub mod markdown;
pub mod prompt;
pub mod themes;
pub mod types;
