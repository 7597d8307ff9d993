//! Shared data model and configuration for the cadence workspace.
//!
//! - [`rule`]: validated recurrence rules and their selectors
//! - [`task`]: tasks, reminders and their identifiers
//! - [`config`]: environment-driven configuration with profile support

pub mod config;
pub mod error;
pub mod rule;
pub mod task;

pub use config::Config;
pub use error::*;
pub use rule::*;
pub use task::*;
