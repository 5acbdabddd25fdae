//! Child Profile Store
//!
//! The owner's child profiles plus the active selection that scopes the
//! diary, routine and reminder pages.

use parking_lot::Mutex;

use super::StoreError;
use crate::domain::{ChildProfile, ChildProfilePatch, Entity, NewChildProfile};
use crate::gateway::{Deleted, SharedGateway};
use crate::notify::Listeners;
use crate::repository::{OwnerScope, Record};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
    pub profiles: Vec<ChildProfile>,
    pub selected_child_id: Option<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl ProfileState {
    pub fn selected(&self) -> Option<&ChildProfile> {
        let id = self.selected_child_id.as_deref()?;
        self.profiles.iter().find(|p| p.child_id == id)
    }
}

#[derive(Default)]
struct Inner {
    owner: Option<OwnerScope>,
    view: ProfileState,
}

pub struct ProfileStore {
    gateway: SharedGateway,
    inner: Mutex<Inner>,
    listeners: Listeners<ProfileState>,
}

impl ProfileStore {
    pub fn new(gateway: SharedGateway) -> Self {
        Self { gateway, inner: Mutex::new(Inner::default()), listeners: Listeners::default() }
    }

    pub fn state(&self) -> ProfileState {
        self.inner.lock().view.clone()
    }

    pub fn selected_child_id(&self) -> Option<String> {
        self.inner.lock().view.selected_child_id.clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&ProfileState) + Send + Sync + 'static) {
        self.listeners.add(listener);
    }

    fn update(&self, f: impl FnOnce(&mut ProfileState)) {
        let snapshot = {
            let mut inner = self.inner.lock();
            f(&mut inner.view);
            inner.view.clone()
        };
        self.listeners.emit(&snapshot);
    }

    /// Switch owner; a different owner starts from an empty state
    pub fn set_owner(&self, owner_id: Option<&str>) {
        {
            let mut inner = self.inner.lock();
            if inner.owner.as_ref().map(OwnerScope::owner_id) == owner_id {
                return;
            }
            inner.owner = owner_id.map(|id| OwnerScope::new(self.gateway.clone(), id));
        }
        self.reset();
    }

    /// Drop every profile and the selection
    pub fn reset(&self) {
        self.update(|s| *s = ProfileState::default());
    }

    pub fn select(&self, child_id: Option<&str>) {
        let child_id = child_id.map(str::to_string);
        self.update(|s| s.selected_child_id = child_id);
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }

    /// Start a request: returns the owner scope and marks the store busy
    fn begin(&self) -> Result<OwnerScope, StoreError> {
        let owner = self.inner.lock().owner.clone();
        match owner {
            Some(owner) => {
                self.update(|s| {
                    s.is_loading = true;
                    s.error = None;
                });
                Ok(owner)
            }
            None => {
                self.update(|s| s.error = Some(StoreError::NotAuthenticated.to_string()));
                Err(StoreError::NotAuthenticated)
            }
        }
    }

    /// Apply a settled request unless the owner changed meanwhile
    fn settle<R>(
        &self,
        owner: &OwnerScope,
        result: Result<R, StoreError>,
        apply: impl FnOnce(&mut ProfileState, &R),
    ) -> Result<R, StoreError> {
        let snapshot = {
            let mut inner = self.inner.lock();
            if inner.owner.as_ref().map(OwnerScope::owner_id) != Some(owner.owner_id()) {
                return Err(StoreError::SessionChanged);
            }
            inner.view.is_loading = false;
            match &result {
                Ok(value) => apply(&mut inner.view, value),
                Err(e) => {
                    log::error!("[PROFILES] {}", e);
                    inner.view.error = Some(e.to_string());
                }
            }
            inner.view.clone()
        };
        self.listeners.emit(&snapshot);
        result
    }

    /// Load the owner's profiles (by name). Selects the first profile when
    /// nothing valid is selected; a failure empties the list.
    pub async fn fetch(&self) -> Result<Vec<ChildProfile>, StoreError> {
        let owner = self.begin()?;
        let result = owner.list::<ChildProfile>().await.map_err(StoreError::from);
        let outcome = self.settle(&owner, result, |s, profiles| {
            s.profiles = profiles.clone();
            let still_present = s.selected().is_some();
            if !still_present {
                s.selected_child_id = s.profiles.first().map(|p| p.child_id.clone());
            }
        });
        if matches!(&outcome, Err(e) if *e != StoreError::SessionChanged) {
            self.update(|s| s.profiles.clear());
        }
        outcome
    }

    /// Create a profile; the first one becomes the selection
    pub async fn add(&self, profile: &NewChildProfile) -> Result<ChildProfile, StoreError> {
        if profile.nome_crianca.trim().is_empty() {
            return Err(StoreError::Validation("Nome é obrigatório".to_string()));
        }
        let owner = self.begin()?;
        let result = owner.insert::<ChildProfile, _>(profile).await.map_err(StoreError::from);
        self.settle(&owner, result, |s, created| {
            s.profiles.push(created.clone());
            s.profiles.sort_by(ChildProfile::listing_cmp);
            if s.profiles.len() == 1 {
                s.selected_child_id = Some(created.child_id.clone());
            }
        })
    }

    pub async fn update_profile(&self, child_id: &str, patch: &ChildProfilePatch) -> Result<ChildProfile, StoreError> {
        let owner = self.begin()?;
        let result = match owner.update::<ChildProfile, _>(child_id, patch).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(StoreError::NotFound(child_id.to_string())),
            Err(e) => Err(e.into()),
        };
        self.settle(&owner, result, |s, updated| {
            if let Some(slot) = s.profiles.iter_mut().find(|p| p.id() == updated.id()) {
                *slot = updated.clone();
            }
            s.profiles.sort_by(ChildProfile::listing_cmp);
        })
    }

    /// Remove a profile. If it was selected, the first remaining profile
    /// (or none) becomes the selection.
    pub async fn delete(&self, child_id: &str) -> Result<(), StoreError> {
        let owner = self.begin()?;
        let result = owner.delete::<ChildProfile>(child_id).await.map_err(StoreError::from);
        if result == Ok(Deleted::NotFound) {
            log::warn!("[PROFILES] Profile {} was already gone", child_id);
        }
        self.settle(&owner, result, |s, _| {
            s.profiles.retain(|p| p.child_id != child_id);
            if s.selected_child_id.as_deref() == Some(child_id) {
                s.selected_child_id = s.profiles.first().map(|p| p.child_id.clone());
            }
        })
        .map(|_| ())
    }
}
