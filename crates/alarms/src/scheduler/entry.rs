//! Trigger map entries and per-call reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cadence_core::{ReminderId, TaskId};

use crate::eligibility::Ineligible;
use crate::error::AlarmError;
use crate::traits::TriggerHandle;

/// A trigger confirmed by the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArmedTrigger {
    /// Handle returned at registration; needed to cancel.
    pub handle: TriggerHandle,
    /// Instant the trigger fires.
    pub armed_for: DateTime<Utc>,
}

/// One reminder armed during a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmedReminder {
    pub reminder_id: ReminderId,
    pub handle: TriggerHandle,
    pub at: DateTime<Utc>,
}

/// What an eligible arm call did, reminder by reminder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArmReport {
    /// Reminders with a fresh trigger.
    pub armed: Vec<ArmedReminder>,
    /// Reminders whose rule has no upcoming occurrence within the scan cap.
    pub unscheduled: Vec<ReminderId>,
    /// Previously armed reminders the task no longer lists.
    pub retired: Vec<ReminderId>,
}

/// Result of arming one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArmOutcome {
    /// The task was ineligible; nothing was registered or cancelled.
    Skipped { reason: Ineligible },
    Armed(ArmReport),
}

impl ArmOutcome {
    /// Number of triggers registered by the call.
    pub fn armed_count(&self) -> usize {
        match self {
            ArmOutcome::Skipped { .. } => 0,
            ArmOutcome::Armed(report) => report.armed.len(),
        }
    }
}

/// Outcome of a boot replay for one task.
#[derive(Debug)]
pub struct ReplayEntry {
    pub task_id: TaskId,
    pub result: Result<ArmOutcome, AlarmError>,
}

/// Per-task outcomes of [`replay_all`](super::AlarmScheduler::replay_all),
/// in the order the tasks were given.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub entries: Vec<ReplayEntry>,
}

impl ReplayReport {
    /// Total triggers registered across all tasks.
    pub fn armed_count(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().ok())
            .map(ArmOutcome::armed_count)
            .sum()
    }

    /// Tasks that were skipped as ineligible.
    pub fn skipped(&self) -> impl Iterator<Item = (&TaskId, &Ineligible)> {
        self.entries.iter().filter_map(|e| match &e.result {
            Ok(ArmOutcome::Skipped { reason }) => Some((&e.task_id, reason)),
            _ => None,
        })
    }

    /// Tasks whose replay failed.
    pub fn failures(&self) -> impl Iterator<Item = (&TaskId, &AlarmError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (&e.task_id, err)))
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use cadence_core::Frequency;

    use super::*;

    #[test]
    fn outcomes_serialize_with_status_tag() {
        let skipped = ArmOutcome::Skipped {
            reason: Ineligible::Frequency {
                frequency: Frequency::Weekly,
            },
        };
        assert_eq!(
            serde_json::to_value(&skipped).unwrap(),
            serde_json::json!({
                "status": "skipped",
                "reason": { "reason": "frequency", "frequency": "weekly" }
            })
        );

        let armed = ArmOutcome::Armed(ArmReport {
            unscheduled: vec![ReminderId::new("late")],
            ..ArmReport::default()
        });
        let value = serde_json::to_value(&armed).unwrap();
        assert_eq!(value["status"], "armed");
        assert_eq!(value["unscheduled"], serde_json::json!(["late"]));
        assert_eq!(armed.armed_count(), 0);
    }
}
