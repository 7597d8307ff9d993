//! Recurrence-occurrence engine.
//!
//! This crate provides:
//! - Calendar helpers (month lengths, nth weekday, clamped days)
//! - The candidate date stream a rule selects, period by period
//! - [`OccurrenceGenerator`] turning rules and reminders into future timestamps
//! - One-line rule descriptions for previews

pub mod anchored;
pub mod calendar;
pub mod occurrence;
pub mod stream;
pub mod summary;

pub use anchored::{monthly_on_anchor_day, monthly_on_anchor_weekday};
pub use occurrence::{next_occurrences, OccurrenceGenerator, MAX_SCAN_PERIODS};
pub use stream::CandidateDates;
pub use summary::describe;
