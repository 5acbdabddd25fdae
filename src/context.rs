//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;
use std::sync::Arc;

use companion_core::AppServices;

use crate::models::Page;
use crate::toast::{Toast, ToastKind};

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Stores, gateway and task list controller
    services: StoredValue<Arc<AppServices>>,
    /// Current screen - read
    pub page: ReadSignal<Page>,
    /// Current screen - write
    set_page: WriteSignal<Page>,
    /// Sidebar expanded - read
    pub sidebar_open: ReadSignal<bool>,
    /// Sidebar expanded - write
    set_sidebar_open: WriteSignal<bool>,
    /// Visible toasts - read
    pub toasts: ReadSignal<Vec<Toast>>,
    /// Visible toasts - write
    set_toasts: WriteSignal<Vec<Toast>>,
    next_toast_id: StoredValue<u32>,
}

impl AppContext {
    pub fn new(
        services: Arc<AppServices>,
        page: (ReadSignal<Page>, WriteSignal<Page>),
        sidebar_open: (ReadSignal<bool>, WriteSignal<bool>),
        toasts: (ReadSignal<Vec<Toast>>, WriteSignal<Vec<Toast>>),
    ) -> Self {
        Self {
            services: StoredValue::new(services),
            page: page.0,
            set_page: page.1,
            sidebar_open: sidebar_open.0,
            set_sidebar_open: sidebar_open.1,
            toasts: toasts.0,
            set_toasts: toasts.1,
            next_toast_id: StoredValue::new(0),
        }
    }

    /// Shared handle to the services, for use inside `spawn_local`
    pub fn services(&self) -> Arc<AppServices> {
        self.services.get_value()
    }

    /// Switch screens; pages that need a session fall back to login
    pub fn navigate(&self, page: Page) {
        let signed_in = self.services.with_value(|s| s.auth.session().is_some());
        let target = if page.requires_session() && !signed_in { Page::Login } else { page };
        log::debug!("[APP] Navigate to {:?}", target);
        self.set_page.set(target);
    }

    pub fn toggle_sidebar(&self) {
        self.set_sidebar_open.update(|open| *open = !*open);
    }

    // ========================
    // Toasts
    // ========================

    /// Show a toast; returns its id for dismissal
    pub fn toast(&self, kind: ToastKind, title: impl Into<String>, description: impl Into<String>) -> u32 {
        let id = self.next_toast_id.get_value();
        self.next_toast_id.set_value(id + 1);
        let toast = Toast { id, kind, title: title.into(), description: description.into() };
        self.set_toasts.update(|list| list.push(toast));
        id
    }

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) -> u32 {
        self.toast(ToastKind::Success, title, description)
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) -> u32 {
        self.toast(ToastKind::Destructive, title, description)
    }

    pub fn dismiss(&self, id: u32) {
        self.set_toasts.update(|list| list.retain(|t| t.id != id));
    }
}
