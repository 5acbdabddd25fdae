//! TDAH Companheiro Frontend App
//!
//! Builds the services, restores the saved session and switches between
//! the auth screens and the sidebar layout.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use std::sync::Arc;

use companion_core::gateway::MemoryGateway;
use companion_core::identity::MemoryAuth;
use companion_core::{AppConfig, AppServices};

use crate::backend;
use crate::components::{Header, Sidebar};
use crate::context::AppContext;
use crate::models::Page;
use crate::pages::{DashboardPage, DiaryPage, LoginPage, RemindersPage, RoutinePage, SignUpPage};
use crate::store::{bridge_services, AppState, AppStateStoreFields};
use crate::theme::create_theme_signal;
use crate::toast::ToastViewport;

fn build_services() -> AppServices {
    match backend::create_services() {
        Ok(services) => services,
        Err(e) => {
            log::error!("[APP] Backend unavailable ({}), starting in demo mode", e);
            AppServices::new(AppConfig::demo(), Arc::new(MemoryGateway::new()), Arc::new(MemoryAuth::new()))
        }
    }
}

#[component]
pub fn App() -> impl IntoView {
    let services = Arc::new(build_services());
    services.restore(backend::load_session());

    // Store mirrors the core stores from here on
    let store = Store::new(AppState::new(&services));
    bridge_services(store, &services);
    provide_context(store);

    let signed_in = services.auth.session().is_some();
    let page = signal(if signed_in { Page::Dashboard } else { Page::Login });
    let sidebar_open = signal(true);
    let toasts = signal(Vec::new());

    let ctx = AppContext::new(services, page, sidebar_open, toasts);
    provide_context(ctx);

    let (theme, set_theme) = create_theme_signal();

    // Persist the session and leave protected pages when it ends
    Effect::new(move |_| {
        let session = store.auth().read().session.clone();
        backend::save_session(session.as_ref());
        if session.is_none() && ctx.page.get_untracked().requires_session() {
            ctx.navigate(Page::Login);
        }
    });

    // Fetch child profiles for every new user
    let user_id = Memo::new(move |_| store.auth().read().user.as_ref().map(|u| u.id.clone()));
    Effect::new(move |_| {
        let Some(id) = user_id.get() else { return };
        log::debug!("[APP] Loading profiles for {}", id);
        let services = ctx.services();
        spawn_local(async move {
            if let Err(e) = services.fetch_profiles().await {
                ctx.error("Erro ao carregar perfis", e.to_string());
            }
        });
    });

    let content = move || match ctx.page.get() {
        Page::Login => view! { <LoginPage /> }.into_any(),
        Page::SignUp => view! { <SignUpPage /> }.into_any(),
        Page::Dashboard => view! { <DashboardPage /> }.into_any(),
        Page::Diary => view! { <DiaryPage /> }.into_any(),
        Page::Routine => view! { <RoutinePage /> }.into_any(),
        Page::Reminders => view! { <RemindersPage /> }.into_any(),
    };

    view! {
        <Show
            when=move || ctx.page.get().requires_session()
            fallback=content
        >
            <div class="app-layout">
                <Sidebar />
                <div class="app-main">
                    <Header theme=theme set_theme=set_theme />
                    <main class="main-content">{content}</main>
                </div>
            </div>
        </Show>
        <ToastViewport />
    }
}
