//! Per-Child Record Lists
//!
//! Request/response CRUD for diary entries and reminders. Nothing is
//! optimistic here: local state changes only after the backend accepted
//! the write.

use parking_lot::Mutex;
use serde::Serialize;

use super::StoreError;
use crate::domain::{Entity, Reminder, ReminderPatch};
use crate::gateway::SharedGateway;
use crate::notify::Listeners;
use crate::repository::{ChildScope, OwnerScope, Record};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordListState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> Default for RecordListState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), is_loading: false, error: None }
    }
}

struct Inner<T> {
    owner: Option<OwnerScope>,
    child_id: Option<String>,
    view: RecordListState<T>,
}

/// Records of one kind for the active child
pub struct RecordList<T: Record> {
    gateway: SharedGateway,
    inner: Mutex<Inner<T>>,
    listeners: Listeners<RecordListState<T>>,
}

impl<T: Record> RecordList<T> {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            inner: Mutex::new(Inner { owner: None, child_id: None, view: RecordListState::default() }),
            listeners: Listeners::default(),
        }
    }

    pub fn state(&self) -> RecordListState<T> {
        self.inner.lock().view.clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.lock().view.items.clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&RecordListState<T>) + Send + Sync + 'static) {
        self.listeners.add(listener);
    }

    fn modify(&self, f: impl FnOnce(&mut RecordListState<T>)) {
        let snapshot = {
            let mut inner = self.inner.lock();
            f(&mut inner.view);
            inner.view.clone()
        };
        self.listeners.emit(&snapshot);
    }

    pub fn set_owner(&self, owner_id: Option<&str>) {
        {
            let mut inner = self.inner.lock();
            if inner.owner.as_ref().map(OwnerScope::owner_id) == owner_id {
                return;
            }
            inner.owner = owner_id.map(|id| OwnerScope::new(self.gateway.clone(), id));
            inner.child_id = None;
        }
        self.modify(|s| *s = RecordListState::default());
    }

    /// Scope the list to another child; the current items are dropped
    pub fn set_child(&self, child_id: Option<&str>) {
        {
            let mut inner = self.inner.lock();
            if inner.child_id.as_deref() == child_id {
                return;
            }
            inner.child_id = child_id.map(str::to_string);
        }
        self.modify(|s| *s = RecordListState::default());
    }

    fn scope(&self) -> Result<ChildScope, StoreError> {
        let inner = self.inner.lock();
        let owner = inner.owner.as_ref().ok_or(StoreError::NotAuthenticated)?;
        let child_id = inner.child_id.as_deref().ok_or(StoreError::NoActiveChild)?;
        Ok(owner.child(child_id))
    }

    fn begin(&self) -> Result<ChildScope, StoreError> {
        let scope = self.scope()?;
        self.modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        Ok(scope)
    }

    /// Apply a settled request if the list still targets `scope`
    fn settle<R>(
        &self,
        scope: &ChildScope,
        result: Result<R, StoreError>,
        apply: impl FnOnce(&mut Vec<T>, &R),
    ) -> Result<R, StoreError> {
        let snapshot = {
            let mut inner = self.inner.lock();
            let current_owner = inner.owner.as_ref().map(OwnerScope::owner_id);
            if current_owner != Some(scope.owner_id()) || inner.child_id.as_deref() != Some(scope.child_id()) {
                return Err(StoreError::SessionChanged);
            }
            inner.view.is_loading = false;
            match &result {
                Ok(value) => {
                    apply(&mut inner.view.items, value);
                    inner.view.items.sort_by(T::listing_cmp);
                }
                Err(e) => {
                    log::error!("[RECORDS] {} on {}: {}", T::TABLE.as_str(), scope.child_id(), e);
                    inner.view.error = Some(e.to_string());
                }
            }
            inner.view.clone()
        };
        self.listeners.emit(&snapshot);
        result
    }

    /// Replace the items with the backend's rows. A failure keeps them.
    pub async fn load(&self) -> Result<(), StoreError> {
        let scope = self.begin()?;
        let result = scope.list::<T>().await.map_err(StoreError::from);
        self.settle(&scope, result, |items, loaded| *items = loaded.clone()).map(|_| ())
    }

    pub async fn create<N: Serialize>(&self, new: &N) -> Result<T, StoreError> {
        let scope = self.begin()?;
        let result = scope.insert::<T, N>(new).await.map_err(StoreError::from);
        self.settle(&scope, result, |items, created| items.push(created.clone()))
    }

    pub async fn update<P: Serialize>(&self, id: &str, patch: &P) -> Result<T, StoreError> {
        let scope = self.begin()?;
        let result = match scope.update::<T, P>(id, patch).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(StoreError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        };
        self.settle(&scope, result, |items, updated| {
            if let Some(slot) = items.iter_mut().find(|item| item.id() == updated.id()) {
                *slot = updated.clone();
            }
        })
    }

    /// Remove a record; a row that is already gone counts as removed
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let scope = self.begin()?;
        let result = scope.delete::<T>(id).await.map_err(StoreError::from);
        self.settle(&scope, result, |items, _| items.retain(|item| item.id() != id))
            .map(|_| ())
    }
}

impl RecordList<Reminder> {
    /// Flip a reminder between pending and done
    pub async fn toggle_completed(&self, id: &str) -> Result<Reminder, StoreError> {
        let current = self
            .inner
            .lock()
            .view
            .items
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.is_completed)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let patch = ReminderPatch { is_completed: Some(!current), ..Default::default() };
        self.update(id, &patch).await
    }
}
