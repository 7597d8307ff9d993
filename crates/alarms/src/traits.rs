//! Collaborator traits (task source, trigger service) and their error types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cadence_core::{ReminderId, Task, TaskId};

/// Errors returned by a [`TaskSource`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskSourceError {
    #[error("task '{0}' not found")]
    NotFound(TaskId),

    #[error("task source unavailable: {0}")]
    Backend(String),
}

/// Errors returned by a [`TriggerService`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("registering trigger for {key} failed: {reason}")]
    Register { key: TriggerKey, reason: String },

    #[error("cancelling trigger {handle} failed: {reason}")]
    Cancel { handle: TriggerHandle, reason: String },
}

/// Identity of one logical alarm: a reminder of a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerKey {
    pub task_id: TaskId,
    pub reminder_id: ReminderId,
}

impl TriggerKey {
    pub fn new(task_id: impl Into<TaskId>, reminder_id: impl Into<ReminderId>) -> Self {
        Self {
            task_id: task_id.into(),
            reminder_id: reminder_id.into(),
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.task_id, self.reminder_id)
    }
}

/// Opaque handle to a trigger registered with the external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerHandle(Uuid);

impl TriggerHandle {
    /// A fresh random handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TriggerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TriggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Read access to task snapshots.
#[async_trait::async_trait]
pub trait TaskSource: Send + Sync {
    /// Fetch the current snapshot of a task.
    async fn get_task(&self, task_id: &TaskId) -> Result<Task, TaskSourceError>;
}

/// The external wake-up primitive: exact triggers that fire even when the
/// device is idle.
#[async_trait::async_trait]
pub trait TriggerService: Send + Sync {
    /// Register a trigger for `key` firing at `at`.
    async fn register_exact_trigger(
        &self,
        key: &TriggerKey,
        at: DateTime<Utc>,
    ) -> Result<TriggerHandle, TriggerError>;

    /// Cancel a previously registered trigger. Cancelling a trigger that
    /// already fired is not an error.
    async fn cancel_trigger(&self, handle: TriggerHandle) -> Result<(), TriggerError>;

    /// Human-readable name for logs (e.g., "memory").
    fn service_name(&self) -> &str {
        "trigger-service"
    }
}
