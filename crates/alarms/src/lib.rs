//! Alarm eligibility and trigger scheduling for recurring task reminders.
//!
//! Collaborators are reached through the [`TaskSource`] and
//! [`TriggerService`] traits; [`memory`] provides in-process versions of
//! both.

pub mod eligibility;
pub mod error;
pub mod memory;
pub mod scheduler;
pub mod traits;

pub use eligibility::{ineligibility_reason, is_eligible, Ineligible};
pub use error::{AlarmError, Result};
pub use memory::{InMemoryTaskSource, InMemoryTriggerService, TriggerCall};
pub use scheduler::{AlarmScheduler, ArmOutcome, ArmReport, ArmedReminder, ArmedTrigger, ReplayReport};
pub use traits::{TaskSource, TaskSourceError, TriggerError, TriggerHandle, TriggerKey, TriggerService};
