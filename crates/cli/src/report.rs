//! Serializable views of previews, rule summaries and replay outcomes.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, TimeZone};
use serde::Serialize;

use cadence_alarms::{ineligibility_reason, ArmOutcome, ReplayReport};
use cadence_core::{Task, TaskType};
use cadence_recurrence::{describe, OccurrenceGenerator};

#[derive(Debug, Clone, Serialize)]
pub struct ReminderPreview {
    pub reminder_id: String,
    /// Wall-clock time, `HH:MM`.
    pub time: String,
    /// Upcoming occurrences as RFC 3339 in the reference zone.
    pub occurrences: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskPreview {
    pub task_id: String,
    pub title: String,
    pub task_type: TaskType,
    pub schedule: String,
    /// Whether reminders of this task become wake-up triggers.
    pub alarms: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarms_reason: Option<String>,
    pub reminders: Vec<ReminderPreview>,
}

/// Upcoming occurrences of every reminder of `task`, after `now`.
pub fn preview_task<Tz>(
    task: &Task,
    generator: &OccurrenceGenerator,
    count: usize,
    now: &DateTime<Tz>,
) -> TaskPreview
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let reminders = task
        .reminders()
        .iter()
        .map(|reminder| {
            let occurrences = match task.recurrence() {
                Some(rule) => generator
                    .next_occurrences(rule, reminder, count, now)
                    .iter()
                    .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .collect(),
                None => Vec::new(),
            };
            ReminderPreview {
                reminder_id: reminder.id.to_string(),
                time: reminder.time_of_day.format("%H:%M").to_string(),
                occurrences,
            }
        })
        .collect();

    let reason = ineligibility_reason(task);
    TaskPreview {
        task_id: task.id().to_string(),
        title: task.title().to_string(),
        task_type: task.task_type(),
        schedule: schedule_summary(task),
        alarms: reason.is_none(),
        alarms_reason: reason.map(|r| r.to_string()),
        reminders,
    }
}

/// One-line recurrence summary, or "does not repeat".
pub fn schedule_summary(task: &Task) -> String {
    task.recurrence()
        .map(describe)
        .unwrap_or_else(|| "does not repeat".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStatus {
    Armed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArmedRow {
    pub reminder_id: String,
    pub at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayRow {
    pub task_id: String,
    pub status: ReplayStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub armed: Vec<ArmedRow>,
}

/// Flatten a replay report into rows, with armed times shown in `zone`.
pub fn replay_rows<Tz>(report: &ReplayReport, zone: &Tz) -> Vec<ReplayRow>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    report
        .entries
        .iter()
        .map(|entry| {
            let task_id = entry.task_id.to_string();
            match &entry.result {
                Ok(ArmOutcome::Skipped { reason }) => ReplayRow {
                    task_id,
                    status: ReplayStatus::Skipped,
                    detail: reason.to_string(),
                    armed: Vec::new(),
                },
                Ok(ArmOutcome::Armed(armed)) => ReplayRow {
                    task_id,
                    status: ReplayStatus::Armed,
                    detail: if armed.unscheduled.is_empty() {
                        String::new()
                    } else {
                        format!("{} reminder(s) without upcoming occurrence", armed.unscheduled.len())
                    },
                    armed: armed
                        .armed
                        .iter()
                        .map(|a| ArmedRow {
                            reminder_id: a.reminder_id.to_string(),
                            at: a
                                .at
                                .with_timezone(zone)
                                .to_rfc3339_opts(SecondsFormat::Secs, true),
                        })
                        .collect(),
                },
                Err(e) => ReplayRow {
                    task_id,
                    status: ReplayStatus::Failed,
                    detail: e.to_string(),
                    armed: Vec::new(),
                },
            }
        })
        .collect()
}
