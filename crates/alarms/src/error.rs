use thiserror::Error;

use crate::traits::{TaskSourceError, TriggerError};

/// Failures while arming or cancelling alarms.
///
/// A failed call leaves the trigger map holding only confirmed state:
/// entries are added after a successful registration and removed after a
/// successful cancellation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlarmError {
    #[error("task source: {0}")]
    TaskSource(#[from] TaskSourceError),

    #[error("trigger service: {0}")]
    Trigger(#[from] TriggerError),
}

pub type Result<T> = std::result::Result<T, AlarmError>;
