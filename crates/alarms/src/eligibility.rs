//! Which tasks get real wake-up triggers.
//!
//! Only daily-type tasks whose rule recurs at day level are armed. Weekly,
//! monthly and yearly rules still produce previews through the occurrence
//! generator but never register triggers.

use std::fmt;

use serde::{Deserialize, Serialize};

use cadence_core::{Frequency, Task, TaskType};

/// Why a task is not armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Ineligible {
    /// Habits, todos and rewards do not recur.
    TaskType { task_type: TaskType },
    /// Daily-type task stored without a rule.
    MissingRecurrence,
    /// Rule recurs weekly, monthly or yearly.
    Frequency { frequency: Frequency },
}

impl fmt::Display for Ineligible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ineligible::TaskType { task_type } => write!(f, "{task_type} tasks are not armed"),
            Ineligible::MissingRecurrence => write!(f, "task has no recurrence rule"),
            Ineligible::Frequency { frequency } => write!(f, "{frequency} rules are not armed"),
        }
    }
}

/// `None` when the task qualifies for triggers, else the reason it does not.
pub fn ineligibility_reason(task: &Task) -> Option<Ineligible> {
    if task.task_type() != TaskType::Daily {
        return Some(Ineligible::TaskType {
            task_type: task.task_type(),
        });
    }
    match task.recurrence().map(|rule| rule.frequency()) {
        None => Some(Ineligible::MissingRecurrence),
        Some(Frequency::Daily) => None,
        Some(frequency) => Some(Ineligible::Frequency { frequency }),
    }
}

pub fn is_eligible(task: &Task) -> bool {
    ineligibility_reason(task).is_none()
}
