//! Trigger (re)scheduling for task reminders.
//!
//! The [`AlarmScheduler`] fetches a task snapshot, checks eligibility, asks
//! the occurrence generator for each reminder's next timestamp and keeps the
//! external trigger service in step with it. It owns the in-memory map from
//! (task, reminder) to the live trigger handle.

mod core;
mod entry;


pub use self::core::AlarmScheduler;
pub use self::entry::{ArmOutcome, ArmReport, ArmedReminder, ArmedTrigger, ReplayEntry, ReplayReport};
