//! In-process task source and trigger service.
//!
//! Used by the CLI for previews and boot replay, and by tests. The trigger
//! service keeps a log of every call and can be told to fail.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use cadence_core::{Task, TaskId};

use crate::traits::{TaskSource, TaskSourceError, TriggerError, TriggerHandle, TriggerKey, TriggerService};

// ── Task source ───────────────────────────────────────────────

/// Task snapshots held in a map.
#[derive(Debug, Default)]
pub struct InMemoryTaskSource {
    tasks: RwLock<HashMap<TaskId, Task>>,
    unavailable: AtomicBool,
}

impl InMemoryTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks<I: IntoIterator<Item = Task>>(tasks: I) -> Self {
        let source = Self::new();
        for task in tasks {
            source.upsert(task);
        }
        source
    }

    /// Insert or replace a task. Returns the previous snapshot.
    pub fn upsert(&self, task: Task) -> Option<Task> {
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task.id().clone(), task)
    }

    pub fn remove(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(task_id)
    }

    /// All task ids, sorted.
    pub fn task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self
            .tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.tasks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every fetch fail with [`TaskSourceError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl TaskSource for InMemoryTaskSource {
    async fn get_task(&self, task_id: &TaskId) -> Result<Task, TaskSourceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TaskSourceError::Backend("in-memory source marked unavailable".to_string()));
        }
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(task_id)
            .cloned()
            .ok_or_else(|| TaskSourceError::NotFound(task_id.clone()))
    }
}

// ── Trigger service ───────────────────────────────────────────

/// One call received by [`InMemoryTriggerService`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum TriggerCall {
    Register {
        key: TriggerKey,
        at: DateTime<Utc>,
        handle: TriggerHandle,
    },
    Cancel {
        handle: TriggerHandle,
    },
}

#[derive(Debug, Default)]
struct TriggerState {
    live: HashMap<TriggerHandle, (TriggerKey, DateTime<Utc>)>,
    calls: Vec<TriggerCall>,
}

/// Trigger service that keeps live triggers in a map.
#[derive(Debug, Default)]
pub struct InMemoryTriggerService {
    state: Mutex<TriggerState>,
    fail_register: AtomicBool,
    fail_cancel: AtomicBool,
}

impl InMemoryTriggerService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent registrations fail.
    pub fn fail_registrations(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent cancellations fail.
    pub fn fail_cancellations(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::SeqCst);
    }

    /// Every successful call, in order.
    pub fn calls(&self) -> Vec<TriggerCall> {
        self.state().calls.clone()
    }

    pub fn registrations(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, TriggerCall::Register { .. }))
            .count()
    }

    pub fn cancellations(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, TriggerCall::Cancel { .. }))
            .count()
    }

    /// Live triggers ordered by fire time, then key.
    pub fn live_triggers(&self) -> Vec<(TriggerKey, DateTime<Utc>)> {
        let mut live: Vec<_> = self.state().live.values().cloned().collect();
        live.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        live
    }

    /// Fire every trigger due at or before `now`, removing it. Returns the
    /// fired keys with their handles, earliest first.
    pub fn fire_due(&self, now: DateTime<Utc>) -> Vec<(TriggerKey, TriggerHandle)> {
        let mut state = self.state();
        let mut due: Vec<(TriggerHandle, TriggerKey, DateTime<Utc>)> = state
            .live
            .iter()
            .filter(|(_, (_, at))| *at <= now)
            .map(|(handle, (key, at))| (*handle, key.clone(), *at))
            .collect();
        due.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.1.cmp(&b.1)));
        for (handle, _, _) in &due {
            state.live.remove(handle);
        }
        due.into_iter().map(|(handle, key, _)| (key, handle)).collect()
    }

    fn state(&self) -> MutexGuard<'_, TriggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl TriggerService for InMemoryTriggerService {
    async fn register_exact_trigger(
        &self,
        key: &TriggerKey,
        at: DateTime<Utc>,
    ) -> Result<TriggerHandle, TriggerError> {
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(TriggerError::Register {
                key: key.clone(),
                reason: "registration refused".to_string(),
            });
        }
        let handle = TriggerHandle::new();
        let mut state = self.state();
        state.live.insert(handle, (key.clone(), at));
        state.calls.push(TriggerCall::Register {
            key: key.clone(),
            at,
            handle,
        });
        Ok(handle)
    }

    async fn cancel_trigger(&self, handle: TriggerHandle) -> Result<(), TriggerError> {
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(TriggerError::Cancel {
                handle,
                reason: "cancellation refused".to_string(),
            });
        }
        let mut state = self.state();
        state.live.remove(&handle);
        state.calls.push(TriggerCall::Cancel { handle });
        Ok(())
    }

    fn service_name(&self) -> &str {
        "memory"
    }
}
