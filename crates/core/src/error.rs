use thiserror::Error;

use crate::task::TaskType;

/// Configuration errors raised while building rules, reminders and tasks.
///
/// All of these surface at construction (or deserialization) time, never
/// halfway through an occurrence scan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("interval must be at least 1, got {0}")]
    InvalidInterval(u32),

    #[error("monthly rule needs at least one day of month or week of month")]
    EmptyMonthlySelector,

    #[error("monthly rule cannot select days of month and weeks of month at once")]
    ConflictingMonthlySelector,

    #[error("weekly rule selects no weekdays")]
    EmptyWeekdays,

    #[error("day of month {0} is outside 1..=31")]
    DayOfMonthOutOfRange(u8),

    #[error("week of month {0} is outside 0..=4")]
    WeekOfMonthOutOfRange(u8),

    #[error("invalid reminder time '{0}'")]
    InvalidTime(String),

    #[error("{0} task cannot carry a recurrence rule")]
    UnexpectedRecurrence(TaskType),

    #[error("daily task '{0}' has no recurrence rule")]
    MissingRecurrence(String),

    #[error("duplicate reminder id '{0}'")]
    DuplicateReminder(String),
}

/// Result alias for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;
