//! Ordered Task List Controller
//!
//! Holds the working copy of one child's routine tasks. Every mutation is
//! applied to the local sequence first (so the board re-renders at once) and
//! then persisted. Mutations persist one at a time through a FIFO slot; a
//! mutation queued behind another builds on its optimistic result. When a
//! write fails the list is reloaded from the backend, and any queued
//! mutation whose optimistic base was thrown away is abandoned.

use parking_lot::Mutex;
use serde_json::json;

use super::error::{FailureCause, TaskListError};
use crate::domain::{NewTask, Task};
use crate::gateway::{BatchOutcome, SharedGateway};
use crate::notify::Listeners;
use crate::repository::{assign_positions, list_move, next_order, position_updates, ChildScope, OwnerScope};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing loaded yet
    Uninitialized,
    /// A load is in flight and nothing is being persisted
    Loading,
    /// Idle; gestures are accepted
    Ready,
    /// At least one mutation is in flight or queued; gestures are queued
    Reconciling,
}

/// What the UI renders
#[derive(Debug, Clone, PartialEq)]
pub struct TaskListSnapshot {
    pub child_id: Option<String>,
    pub tasks: Vec<Task>,
    pub phase: Phase,
}

#[derive(Default)]
struct ListState {
    owner: Option<OwnerScope>,
    child_id: Option<String>,
    tasks: Vec<Task>,
    loaded: bool,
    /// Generation of the load currently in flight, if it is the latest one
    loading: Option<u64>,
    load_generation: u64,
    /// Mutations applied locally and not yet settled
    pending: usize,
    /// Bumped whenever the sequence is replaced wholesale
    epoch: u64,
}

impl ListState {
    fn phase(&self) -> Phase {
        if self.pending > 0 {
            Phase::Reconciling
        } else if self.loading.is_some() {
            Phase::Loading
        } else if self.loaded {
            Phase::Ready
        } else {
            Phase::Uninitialized
        }
    }

    fn replace(&mut self, child_id: &str, mut tasks: Vec<Task>) {
        tasks.sort_by(Task::display_cmp);
        self.tasks = tasks;
        self.child_id = Some(child_id.to_string());
        self.loaded = true;
        self.epoch += 1;
    }

    fn position(&self, task_id: &str) -> Result<usize, TaskListError> {
        self.tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| TaskListError::TaskNotFound(task_id.to_string()))
    }
}

/// A mutation that has been applied locally
struct Ticket {
    epoch: u64,
    scope: ChildScope,
}

/// Marks one pending mutation; settling (or dropping the future) releases it
struct PendingGuard<'a> {
    controller: &'a TaskListController,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.controller.state.lock();
            state.pending = state.pending.saturating_sub(1);
        }
        self.controller.emit();
    }
}

/// Ordered task list for the active child profile
pub struct TaskListController {
    gateway: SharedGateway,
    state: Mutex<ListState>,
    /// Single in-flight mutation; tokio's mutex grants it in request order
    slot: tokio::sync::Mutex<()>,
    listeners: Listeners<TaskListSnapshot>,
}

impl TaskListController {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            state: Mutex::new(ListState::default()),
            slot: tokio::sync::Mutex::new(()),
            listeners: Listeners::default(),
        }
    }

    // ========================
    // Read accessors
    // ========================

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    pub fn active_child(&self) -> Option<String> {
        self.state.lock().child_id.clone()
    }

    /// Completed and total task counts
    pub fn progress(&self) -> (usize, usize) {
        let state = self.state.lock();
        let done = state.tasks.iter().filter(|t| t.is_completed).count();
        (done, state.tasks.len())
    }

    pub fn snapshot(&self) -> TaskListSnapshot {
        let state = self.state.lock();
        TaskListSnapshot {
            child_id: state.child_id.clone(),
            tasks: state.tasks.clone(),
            phase: state.phase(),
        }
    }

    /// Called after every local change with the new snapshot
    pub fn subscribe(&self, listener: impl Fn(&TaskListSnapshot) + Send + Sync + 'static) {
        self.listeners.add(listener);
    }

    fn emit(&self) {
        let snapshot = self.snapshot();
        self.listeners.emit(&snapshot);
    }

    // ========================
    // Session
    // ========================

    /// Switch the authenticated owner; any change drops the local list
    pub fn set_owner(&self, owner_id: Option<&str>) {
        {
            let mut state = self.state.lock();
            let current = state.owner.as_ref().map(|o| o.owner_id().to_string());
            if current.as_deref() == owner_id {
                return;
            }
            state.owner = owner_id.map(|id| OwnerScope::new(self.gateway.clone(), id));
            Self::reset(&mut state);
        }
        self.emit();
    }

    /// Drop the local list (no child selected)
    pub fn clear(&self) {
        Self::reset(&mut self.state.lock());
        self.emit();
    }

    fn reset(state: &mut ListState) {
        state.tasks.clear();
        state.child_id = None;
        state.loaded = false;
        state.loading = None;
        state.load_generation += 1;
        state.epoch += 1;
    }

    // ========================
    // Load
    // ========================

    /// Replace the local sequence with the backend's tasks for `child_id`.
    /// Waits behind mutations already in flight, so the result includes
    /// their writes. On failure the previous sequence is kept. A load
    /// overtaken by a newer one discards its result.
    pub async fn load(&self, child_id: &str) -> Result<(), TaskListError> {
        let (scope, generation) = {
            let mut state = self.state.lock();
            let owner = state.owner.clone().ok_or(TaskListError::NotAuthenticated)?;
            state.load_generation += 1;
            state.loading = Some(state.load_generation);
            (owner.child(child_id), state.load_generation)
        };
        self.emit();

        let _slot = self.slot.lock().await;
        if self.state.lock().load_generation != generation {
            log::debug!("[TASKS] Skipping load {} for child {}, a newer one is queued", generation, child_id);
            return Ok(());
        }
        log::debug!("[TASKS] Loading tasks for child {} (generation {})", child_id, generation);

        let result = scope.list::<Task>().await;

        let outcome = {
            let mut state = self.state.lock();
            if state.load_generation != generation {
                log::debug!("[TASKS] Discarding superseded load {} for child {}", generation, child_id);
                return Ok(());
            }
            state.loading = None;
            match result {
                Ok(tasks) => {
                    log::debug!("[TASKS] Loaded {} tasks for child {}", tasks.len(), child_id);
                    state.replace(child_id, tasks);
                    Ok(())
                }
                Err(e) => Err(TaskListError::FetchError(e)),
            }
        };
        if let Err(e) = &outcome {
            log::error!("[TASKS] {}", e);
        }
        self.emit();
        outcome
    }

    /// Corrective reload after a failed write. Falls back to `fallback`
    /// (the last sequence known to be consistent) if the reload fails too.
    async fn resync(&self, ticket: &Ticket, fallback: Option<Vec<Task>>) {
        let child_id = ticket.scope.child_id().to_string();
        let result = ticket.scope.list::<Task>().await;
        {
            let mut state = self.state.lock();
            if state.child_id.as_deref() != Some(child_id.as_str()) {
                return;
            }
            match result {
                Ok(tasks) => {
                    log::info!("[TASKS] Resynchronized {} tasks for child {}", tasks.len(), child_id);
                    state.replace(&child_id, tasks);
                }
                Err(e) => {
                    log::error!("[TASKS] Corrective reload failed: {}", e);
                    if let Some(tasks) = fallback {
                        state.replace(&child_id, tasks);
                    }
                }
            }
        }
        self.emit();
    }

    // ========================
    // Mutation plumbing
    // ========================

    /// Validate the current phase and apply an optimistic change. `apply`
    /// returns `None` for a no-op, which is not counted as pending.
    fn begin<R>(
        &self,
        apply: impl FnOnce(&mut ListState) -> Result<Option<R>, TaskListError>,
    ) -> Result<Option<(PendingGuard<'_>, Ticket, R)>, TaskListError> {
        let started = {
            let mut state = self.state.lock();
            match state.phase() {
                Phase::Ready | Phase::Reconciling => {}
                phase => return Err(TaskListError::NotReady(phase)),
            }
            let owner = state.owner.clone().ok_or(TaskListError::NotAuthenticated)?;
            let child_id = state.child_id.clone().ok_or(TaskListError::NoActiveChild)?;
            match apply(&mut state)? {
                Some(out) => {
                    state.pending += 1;
                    Some((Ticket { epoch: state.epoch, scope: owner.child(child_id) }, out))
                }
                None => None,
            }
        };
        Ok(started.map(|(ticket, out)| {
            self.emit();
            (PendingGuard { controller: self }, ticket, out)
        }))
    }

    fn is_superseded(&self, ticket: &Ticket) -> bool {
        self.state.lock().epoch != ticket.epoch
    }

    /// Run `revert` against the local state unless it was replaced meanwhile
    fn revert(&self, ticket: &Ticket, revert: impl FnOnce(&mut ListState)) {
        {
            let mut state = self.state.lock();
            if state.epoch != ticket.epoch {
                return;
            }
            revert(&mut state);
        }
        self.emit();
    }

    // ========================
    // Mutations
    // ========================

    /// Move the task at `from` to `to` (list-move, not swap) and persist the
    /// resulting positions `0..n-1` for every task.
    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), TaskListError> {
        let started = self.begin(|state| {
            let len = state.tasks.len();
            for index in [from, to] {
                if index >= len {
                    return Err(TaskListError::IndexOutOfRange { index, len });
                }
            }
            if from == to {
                return Ok(None);
            }
            let before = state.tasks.clone();
            list_move(&mut state.tasks, from, to);
            assign_positions(&mut state.tasks);
            Ok(Some(before))
        })?;
        let Some((_pending, ticket, before)) = started else {
            return Ok(());
        };
        log::debug!("[TASKS] Reorder {} -> {} applied locally", from, to);

        let _slot = self.slot.lock().await;
        if self.is_superseded(&ticket) {
            return Err(TaskListError::ReorderFailed(FailureCause::Superseded));
        }

        // A failed mutation ahead of this one may have put a task back
        let updates = {
            let mut state = self.state.lock();
            assign_positions(&mut state.tasks);
            position_updates(&state.tasks)
        };
        self.emit();
        let total = updates.len();
        let cause = match ticket.scope.batch_set::<Task>("order", updates).await {
            Ok(BatchOutcome::Applied) => {
                log::debug!("[TASKS] Persisted {} positions", total);
                return Ok(());
            }
            Ok(BatchOutcome::Partial { applied, .. }) => FailureCause::PartialWrite { applied: applied.len(), total },
            Err(e) => FailureCause::Gateway(e),
        };

        log::warn!("[TASKS] Reorder failed ({}), reloading", cause);
        self.resync(&ticket, Some(before)).await;
        Err(TaskListError::ReorderFailed(cause))
    }

    /// Flip one task's completion flag
    pub async fn toggle_completion(&self, task_id: &str) -> Result<(), TaskListError> {
        let started = self.begin(|state| {
            let index = state.position(task_id)?;
            let task = &mut state.tasks[index];
            task.is_completed = !task.is_completed;
            Ok(Some(task.is_completed))
        })?;
        let Some((_pending, ticket, completed)) = started else {
            return Ok(());
        };

        let _slot = self.slot.lock().await;
        if self.is_superseded(&ticket) {
            return Err(TaskListError::UpdateFailed(FailureCause::Superseded));
        }

        let patch = json!({ "is_completed": completed });
        match ticket.scope.update::<Task, _>(task_id, &patch).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                log::warn!("[TASKS] Task {} vanished before toggle, reloading", task_id);
                self.resync(&ticket, None).await;
                Err(TaskListError::UpdateFailed(FailureCause::Missing))
            }
            Err(e) => {
                log::warn!("[TASKS] Toggle of {} failed: {}", task_id, e);
                self.revert(&ticket, |state| {
                    if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
                        task.is_completed = !completed;
                    }
                });
                Err(TaskListError::UpdateFailed(e.into()))
            }
        }
    }

    /// Rename one task
    pub async fn update_description(&self, task_id: &str, description: &str) -> Result<(), TaskListError> {
        let description = validate_description(description)?;
        let started = self.begin(|state| {
            let index = state.position(task_id)?;
            let task = &mut state.tasks[index];
            if task.description == description {
                return Ok(None);
            }
            Ok(Some(std::mem::replace(&mut task.description, description.clone())))
        })?;
        let Some((_pending, ticket, previous)) = started else {
            return Ok(());
        };

        let _slot = self.slot.lock().await;
        if self.is_superseded(&ticket) {
            return Err(TaskListError::UpdateFailed(FailureCause::Superseded));
        }

        let patch = json!({ "description": description });
        match ticket.scope.update::<Task, _>(task_id, &patch).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                self.resync(&ticket, None).await;
                Err(TaskListError::UpdateFailed(FailureCause::Missing))
            }
            Err(e) => {
                log::warn!("[TASKS] Rename of {} failed: {}", task_id, e);
                self.revert(&ticket, |state| {
                    if let Some(task) = state.tasks.iter_mut().find(|t| t.id == task_id) {
                        if task.description == description {
                            task.description = previous;
                        }
                    }
                });
                Err(TaskListError::UpdateFailed(e.into()))
            }
        }
    }

    /// Append a task after the current last position. Not optimistic: the
    /// task appears once the backend has assigned its id.
    pub async fn add_task(&self, description: &str) -> Result<Task, TaskListError> {
        let description = validate_description(description)?;
        let started = self.begin(|_| Ok(Some(())))?;
        let Some((_pending, ticket, ())) = started else {
            return Err(TaskListError::NoActiveChild);
        };

        let _slot = self.slot.lock().await;
        let order = {
            let state = self.state.lock();
            if state.child_id.as_deref() != Some(ticket.scope.child_id()) {
                return Err(TaskListError::CreateFailed(FailureCause::Superseded));
            }
            next_order(&state.tasks)
        };

        match ticket.scope.insert::<Task, _>(&NewTask::new(description, order)).await {
            Ok(task) => {
                {
                    let mut state = self.state.lock();
                    let same_child = state.child_id.as_deref() == Some(task.child_id.as_str());
                    if same_child && !state.tasks.iter().any(|t| t.id == task.id) {
                        state.tasks.push(task.clone());
                        state.tasks.sort_by(Task::display_cmp);
                    }
                }
                self.emit();
                log::debug!("[TASKS] Created task {} at order {}", task.id, order);
                Ok(task)
            }
            Err(e) => {
                log::warn!("[TASKS] Create failed: {}", e);
                Err(TaskListError::CreateFailed(e.into()))
            }
        }
    }

    /// Remove one task. Surviving tasks keep their positions.
    pub async fn delete_task(&self, task_id: &str) -> Result<(), TaskListError> {
        let started = self.begin(|state| {
            let index = state.position(task_id)?;
            Ok(Some((index, state.tasks.remove(index))))
        })?;
        let Some((_pending, ticket, (index, removed))) = started else {
            return Ok(());
        };

        let _slot = self.slot.lock().await;
        if self.is_superseded(&ticket) {
            return Err(TaskListError::DeleteFailed(FailureCause::Superseded));
        }

        match ticket.scope.delete::<Task>(task_id).await {
            Ok(_) => Ok(()),
            Err(e) => {
                log::warn!("[TASKS] Delete of {} failed: {}", task_id, e);
                self.revert(&ticket, move |state| {
                    if !state.tasks.iter().any(|t| t.id == removed.id) {
                        let at = index.min(state.tasks.len());
                        state.tasks.insert(at, removed);
                    }
                });
                Err(TaskListError::DeleteFailed(e.into()))
            }
        }
    }
}

fn validate_description(description: &str) -> Result<String, TaskListError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(TaskListError::Validation("Descrição é obrigatória".to_string()));
    }
    Ok(trimmed.to_string())
}

