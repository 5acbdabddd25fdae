//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The core
//! stores push snapshots; the bridge copies each one into its field.

use leptos::prelude::*;
use reactive_stores::Store;

use companion_core::routine::TaskListSnapshot;
use companion_core::stores::{AuthState, ProfileState, RecordListState};
use companion_core::AppServices;

use crate::models::{DiaryEntry, Reminder};

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Store)]
pub struct AppState {
    /// Signed-in user and session
    pub auth: AuthState,
    /// Child profiles and the selected child
    pub profiles: ProfileState,
    /// Routine board of the selected child
    pub tasks: TaskListSnapshot,
    /// Diary entries of the selected child
    pub diary: RecordListState<DiaryEntry>,
    /// Reminders of the selected child
    pub reminders: RecordListState<Reminder>,
}

impl AppState {
    /// Current state of every core store
    pub fn new(services: &AppServices) -> Self {
        Self {
            auth: services.auth.state(),
            profiles: services.profiles.state(),
            tasks: services.tasks.snapshot(),
            diary: services.diary.state(),
            reminders: services.reminders.state(),
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Bridge
// ========================

/// Mirror every core store into `store`
pub fn bridge_services(store: AppStore, services: &AppServices) {
    services.auth.subscribe(move |state| {
        *store.auth().write() = state.clone();
    });
    services.profiles.subscribe(move |state| {
        *store.profiles().write() = state.clone();
    });
    services.tasks.subscribe(move |snapshot| {
        *store.tasks().write() = snapshot.clone();
    });
    services.diary.subscribe(move |state| {
        *store.diary().write() = state.clone();
    });
    services.reminders.subscribe(move |state| {
        *store.reminders().write() = state.clone();
    });
}

/// Selected child id from the store
pub fn store_selected_child(store: &AppStore) -> Option<String> {
    store.profiles().read().selected_child_id.clone()
}

/// Display name of the signed-in user
pub fn store_user_name(store: &AppStore) -> Option<String> {
    store.auth().read().user.as_ref().map(|u| u.display_name())
}
