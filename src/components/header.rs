//! Header Component
//!
//! Greeting, theme switcher and sign-out.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;
use crate::models::Page;
use crate::store::{store_user_name, use_app_store};
use crate::theme::Theme;

#[component]
pub fn Header(theme: ReadSignal<Theme>, set_theme: WriteSignal<Theme>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let (signing_out, set_signing_out) = signal(false);

    let sign_out = move |_| {
        set_signing_out.set(true);
        let services = ctx.services();
        spawn_local(async move {
            match services.sign_out().await {
                Ok(()) => ctx.navigate(Page::Login),
                Err(e) => {
                    log::warn!("[AUTH] Sign out failed: {}", e);
                    ctx.error("Erro ao sair", e.to_string());
                }
            }
            set_signing_out.set(false);
        });
    };

    view! {
        <header class="app-header">
            <span class="header-greeting">
                {move || store_user_name(&store).map(|name| format!("Olá, {}", name)).unwrap_or_default()}
            </span>
            <div class="header-actions">
                <select
                    class="theme-select"
                    title="Tema"
                    prop:value=move || theme.get().as_str()
                    on:change=move |ev| {
                        if let Some(t) = Theme::parse(&event_target_value(&ev)) {
                            set_theme.set(t);
                        }
                    }
                >
                    {Theme::ALL
                        .into_iter()
                        .map(|t| view! { <option value=t.as_str()>{t.label()}</option> })
                        .collect_view()}
                </select>
                <button class="sign-out-btn" disabled=move || signing_out.get() on:click=sign_out>
                    {move || if signing_out.get() { "Saindo..." } else { "Sair" }}
                </button>
            </div>
        </header>
    }
}
