//! Tasks and their reminders.

use std::collections::HashSet;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::rule::RecurrenceRule;

/// Stable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Stable reminder identifier, unique within its task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReminderId(String);

impl ReminderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReminderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReminderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ReminderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of task. Only [`TaskType::Daily`] recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Habit,
    Daily,
    Todo,
    Reward,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Habit => write!(f, "habit"),
            TaskType::Daily => write!(f, "daily"),
            TaskType::Todo => write!(f, "todo"),
            TaskType::Reward => write!(f, "reward"),
        }
    }
}

// ── Reminder ──────────────────────────────────────────────────

/// A wall-clock reminder applied to every occurrence of its task's rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReminder", into = "RawReminder")]
pub struct Reminder {
    pub id: ReminderId,
    /// Hour and minute; seconds are always zero.
    pub time_of_day: NaiveTime,
}

impl Reminder {
    pub fn new(id: impl Into<ReminderId>, hour: u32, minute: u32) -> Result<Self> {
        let time_of_day = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| ModelError::InvalidTime(format!("{hour:02}:{minute:02}")))?;
        Ok(Self {
            id: id.into(),
            time_of_day,
        })
    }

    /// Build a reminder from its stored time value.
    ///
    /// Accepts a local ISO date-time (`2025-07-12T09:00:00`) or a bare time
    /// (`09:00`, `09:00:30`). The date part and seconds are dropped.
    pub fn from_stored_time(id: impl Into<ReminderId>, stored: &str) -> Result<Self> {
        let stored = stored.trim();
        let time = NaiveDateTime::parse_from_str(stored, "%Y-%m-%dT%H:%M:%S")
            .map(|dt| dt.time())
            .or_else(|_| NaiveDateTime::parse_from_str(stored, "%Y-%m-%dT%H:%M").map(|dt| dt.time()))
            .or_else(|_| NaiveTime::parse_from_str(stored, "%H:%M:%S"))
            .or_else(|_| NaiveTime::parse_from_str(stored, "%H:%M"))
            .map_err(|_| ModelError::InvalidTime(stored.to_string()))?;
        Self::new(id, time.hour(), time.minute())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawReminder {
    id: ReminderId,
    time: String,
}

impl TryFrom<RawReminder> for Reminder {
    type Error = ModelError;

    fn try_from(raw: RawReminder) -> Result<Self> {
        Reminder::from_stored_time(raw.id, &raw.time)
    }
}

impl From<Reminder> for RawReminder {
    fn from(reminder: Reminder) -> Self {
        RawReminder {
            id: reminder.id,
            time: reminder.time_of_day.format("%H:%M").to_string(),
        }
    }
}

// ── Task ──────────────────────────────────────────────────────

/// A task snapshot: identity, type, optional recurrence and reminders.
///
/// Daily tasks always carry a rule; every other type never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTask", into = "RawTask")]
pub struct Task {
    id: TaskId,
    task_type: TaskType,
    title: String,
    recurrence: Option<RecurrenceRule>,
    reminders: Vec<Reminder>,
}

impl Task {
    /// A recurring daily-type task.
    pub fn daily(id: impl Into<TaskId>, rule: RecurrenceRule) -> Self {
        Self {
            id: id.into(),
            task_type: TaskType::Daily,
            title: String::new(),
            recurrence: Some(rule),
            reminders: Vec::new(),
        }
    }

    /// A task without recurrence (habit, todo or reward).
    pub fn one_shot(id: impl Into<TaskId>, task_type: TaskType) -> Result<Self> {
        let id = id.into();
        if task_type == TaskType::Daily {
            return Err(ModelError::MissingRecurrence(id.to_string()));
        }
        Ok(Self {
            id,
            task_type,
            title: String::new(),
            recurrence: None,
            reminders: Vec::new(),
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Append a reminder. Reminder ids must be unique within the task.
    pub fn with_reminder(mut self, reminder: Reminder) -> Result<Self> {
        if self.reminder(&reminder.id).is_some() {
            return Err(ModelError::DuplicateReminder(reminder.id.to_string()));
        }
        self.reminders.push(reminder);
        Ok(self)
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn recurrence(&self) -> Option<&RecurrenceRule> {
        self.recurrence.as_ref()
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn reminder(&self, id: &ReminderId) -> Option<&Reminder> {
        self.reminders.iter().find(|r| &r.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawTask {
    id: TaskId,
    #[serde(rename = "type")]
    task_type: TaskType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    repeat: Option<RecurrenceRule>,
    #[serde(default)]
    reminders: Vec<Reminder>,
}

impl TryFrom<RawTask> for Task {
    type Error = ModelError;

    fn try_from(raw: RawTask) -> Result<Self> {
        let task = match (raw.task_type, raw.repeat) {
            (TaskType::Daily, Some(rule)) => Task::daily(raw.id, rule),
            (TaskType::Daily, None) => return Err(ModelError::MissingRecurrence(raw.id.to_string())),
            (other, Some(_)) => return Err(ModelError::UnexpectedRecurrence(other)),
            (other, None) => Task::one_shot(raw.id, other)?,
        };

        let mut seen = HashSet::new();
        for reminder in &raw.reminders {
            if !seen.insert(reminder.id.clone()) {
                return Err(ModelError::DuplicateReminder(reminder.id.to_string()));
            }
        }

        Ok(Task {
            title: raw.title,
            reminders: raw.reminders,
            ..task
        })
    }
}

impl From<Task> for RawTask {
    fn from(task: Task) -> Self {
        RawTask {
            id: task.id,
            task_type: task.task_type,
            title: task.title,
            repeat: task.recurrence,
            reminders: task.reminders,
        }
    }
}
