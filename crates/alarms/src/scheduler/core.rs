//! [`AlarmScheduler`]: keeps external triggers in step with task snapshots.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use tracing::{debug, info, warn};

use cadence_core::config::SchedulerConfig;
use cadence_core::{ReminderId, Task, TaskId};
use cadence_recurrence::OccurrenceGenerator;

use crate::eligibility::{ineligibility_reason, Ineligible};
use crate::error::Result;
use crate::traits::{TaskSource, TriggerHandle, TriggerKey, TriggerService};

use super::entry::{ArmOutcome, ArmReport, ArmedReminder, ArmedTrigger, ReplayEntry, ReplayReport};

type TaskLock = Arc<tokio::sync::Mutex<()>>;
type TaskLocks = Mutex<HashMap<TaskId, TaskLock>>;

/// A caller's share of a per-task lock.
///
/// Dropping the last share removes the task's entry, so the lock map only
/// holds tasks with a call in progress or waiting.
struct TaskLockLease<'a> {
    locks: &'a TaskLocks,
    task_id: TaskId,
    lock: TaskLock,
}

impl Drop for TaskLockLease<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one here: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.task_id);
        }
    }
}

/// Arms, re-arms and cancels wake-up triggers for task reminders.
///
/// Holds at most one live trigger per (task, reminder). Calls for the same
/// task are serialized through a per-task async lock held from the task
/// fetch until the last registration, so the trigger left behind always
/// reflects the most recently completed call. Calls for different tasks run
/// concurrently.
pub struct AlarmScheduler {
    tasks: Arc<dyn TaskSource>,
    triggers: Arc<dyn TriggerService>,
    generator: OccurrenceGenerator,
    /// Fixed task timezone; `None` = system local zone.
    utc_offset: Option<FixedOffset>,
    task_locks: TaskLocks,
    armed: Mutex<HashMap<TriggerKey, ArmedTrigger>>,
}

impl AlarmScheduler {
    pub fn new(tasks: Arc<dyn TaskSource>, triggers: Arc<dyn TriggerService>) -> Self {
        Self {
            tasks,
            triggers,
            generator: OccurrenceGenerator::new(),
            utc_offset: None,
            task_locks: Mutex::new(HashMap::new()),
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// Scheduler using the scan cap and timezone from `config`.
    pub fn from_config(
        tasks: Arc<dyn TaskSource>,
        triggers: Arc<dyn TriggerService>,
        config: &SchedulerConfig,
    ) -> Self {
        Self::new(tasks, triggers)
            .with_generator(OccurrenceGenerator::from_config(config))
            .with_utc_offset(config.utc_offset())
    }

    pub fn with_generator(mut self, generator: OccurrenceGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_utc_offset(mut self, utc_offset: Option<FixedOffset>) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    // ── Arming ────────────────────────────────────────────────

    /// Arm the next occurrence of every reminder of a task, reading the
    /// real clock.
    pub async fn add_alarm_for_task_id(&self, task_id: &TaskId) -> Result<ArmOutcome> {
        match self.utc_offset {
            Some(offset) => {
                self.add_alarm_for_task_id_at(task_id, &Utc::now().with_timezone(&offset))
                    .await
            }
            None => self.add_alarm_for_task_id_at(task_id, &Local::now()).await,
        }
    }

    /// Arm the next occurrence after `now` of every reminder of a task.
    ///
    /// Ineligible tasks are left alone: nothing is registered and nothing is
    /// cancelled. For eligible tasks each reminder's previous trigger is
    /// cancelled before the new one is registered, and triggers of
    /// reminders the task no longer lists are cancelled.
    pub async fn add_alarm_for_task_id_at<Tz: TimeZone>(
        &self,
        task_id: &TaskId,
        now: &DateTime<Tz>,
    ) -> Result<ArmOutcome> {
        let lease = self.task_lock(task_id);
        let _guard = lease.lock.lock().await;

        let task = self.tasks.get_task(task_id).await?;
        self.arm(&task, now).await
    }

    async fn arm<Tz: TimeZone>(&self, task: &Task, now: &DateTime<Tz>) -> Result<ArmOutcome> {
        if let Some(reason) = ineligibility_reason(task) {
            debug!(task_id = %task.id(), %reason, "task not eligible for alarms");
            return Ok(ArmOutcome::Skipped { reason });
        }
        let Some(rule) = task.recurrence() else {
            return Ok(ArmOutcome::Skipped {
                reason: Ineligible::MissingRecurrence,
            });
        };

        let mut report = ArmReport::default();

        for (key, entry) in self.armed_for_task(task.id()) {
            if task.reminder(&key.reminder_id).is_some() {
                continue;
            }
            self.cancel_entry(&key, entry).await?;
            report.retired.push(key.reminder_id);
        }

        for reminder in task.reminders() {
            let key = TriggerKey::new(task.id().clone(), reminder.id.clone());
            if let Some(entry) = self.armed_entry(&key) {
                self.cancel_entry(&key, entry).await?;
            }

            let Some(at) = self.generator.next_occurrence(rule, reminder, now) else {
                debug!(
                    task_id = %key.task_id,
                    reminder_id = %key.reminder_id,
                    max_scan_periods = self.generator.max_scan_periods(),
                    "no upcoming occurrence; reminder left unarmed"
                );
                report.unscheduled.push(reminder.id.clone());
                continue;
            };
            let at = at.with_timezone(&Utc);

            let handle = self.triggers.register_exact_trigger(&key, at).await?;
            self.armed_map().insert(
                key.clone(),
                ArmedTrigger {
                    handle,
                    armed_for: at,
                },
            );
            info!(
                task_id = %key.task_id,
                reminder_id = %key.reminder_id,
                at = %at,
                service = self.triggers.service_name(),
                "alarm armed"
            );
            report.armed.push(ArmedReminder {
                reminder_id: key.reminder_id,
                handle,
                at,
            });
        }

        Ok(ArmOutcome::Armed(report))
    }

    /// Boot replay: arm each task in turn.
    ///
    /// A failing task is logged and recorded; the remaining tasks are still
    /// processed.
    pub async fn replay_all<I, Tz>(&self, task_ids: I, now: &DateTime<Tz>) -> ReplayReport
    where
        I: IntoIterator<Item = TaskId>,
        Tz: TimeZone,
    {
        let mut report = ReplayReport::default();
        for task_id in task_ids {
            let result = self.add_alarm_for_task_id_at(&task_id, now).await;
            if let Err(e) = &result {
                warn!(task_id = %task_id, error = %e, "alarm replay failed");
            }
            report.entries.push(ReplayEntry { task_id, result });
        }
        info!(
            tasks = report.entries.len(),
            armed = report.armed_count(),
            "alarm replay finished"
        );
        report
    }

    // ── Cancelling ────────────────────────────────────────────

    /// Cancel every armed trigger of a task (e.g., on deletion).
    ///
    /// Returns the number of cancelled triggers. Stops at the first failed
    /// cancellation; triggers cancelled before it are already forgotten.
    pub async fn remove_alarms_for_task(&self, task_id: &TaskId) -> Result<usize> {
        let lease = self.task_lock(task_id);
        let _guard = lease.lock.lock().await;

        let mut cancelled = 0;
        for (key, entry) in self.armed_for_task(task_id) {
            self.cancel_entry(&key, entry).await?;
            cancelled += 1;
        }
        if cancelled > 0 {
            info!(task_id = %task_id, cancelled, "alarms removed");
        }
        Ok(cancelled)
    }

    /// Forget a trigger that fired and will not be re-armed.
    ///
    /// Only removes the entry if it still holds `handle`; returns whether it
    /// did.
    pub fn trigger_fired(&self, key: &TriggerKey, handle: TriggerHandle) -> bool {
        let mut armed = self.armed_map();
        match armed.get(key) {
            Some(entry) if entry.handle == handle => {
                armed.remove(key);
                true
            }
            _ => false,
        }
    }

    async fn cancel_entry(&self, key: &TriggerKey, entry: ArmedTrigger) -> Result<()> {
        self.triggers.cancel_trigger(entry.handle).await?;
        let mut armed = self.armed_map();
        if armed.get(key).is_some_and(|e| e.handle == entry.handle) {
            armed.remove(key);
        }
        debug!(
            task_id = %key.task_id,
            reminder_id = %key.reminder_id,
            handle = %entry.handle,
            "trigger cancelled"
        );
        Ok(())
    }

    // ── Inspection ────────────────────────────────────────────

    /// The live trigger for a reminder, if armed.
    pub fn armed(&self, task_id: &TaskId, reminder_id: &ReminderId) -> Option<ArmedTrigger> {
        self.armed_entry(&TriggerKey::new(task_id.clone(), reminder_id.clone()))
    }

    pub fn armed_count(&self) -> usize {
        self.armed_map().len()
    }

    fn armed_for_task(&self, task_id: &TaskId) -> Vec<(TriggerKey, ArmedTrigger)> {
        let mut entries: Vec<_> = self
            .armed_map()
            .iter()
            .filter(|(key, _)| &key.task_id == task_id)
            .map(|(key, entry)| (key.clone(), *entry))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    fn armed_entry(&self, key: &TriggerKey) -> Option<ArmedTrigger> {
        self.armed_map().get(key).copied()
    }

    fn armed_map(&self) -> MutexGuard<'_, HashMap<TriggerKey, ArmedTrigger>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn task_lock(&self, task_id: &TaskId) -> TaskLockLease<'_> {
        let lock = self
            .task_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(task_id.clone())
            .or_default()
            .clone();
        TaskLockLease {
            locks: &self.task_locks,
            task_id: task_id.clone(),
            lock,
        }
    }

    #[cfg(test)]
    pub(super) fn locked_task_count(&self) -> usize {
        self.task_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
