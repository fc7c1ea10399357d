pub mod decks;
pub mod progress;
pub mod themes;
pub mod uploads;
pub mod view;
