//! Sidebar Component
//!
//! Collapsible navigation between the signed-in screens.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::models::Page;

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let sidebar_class = move || if ctx.sidebar_open.get() { "sidebar open" } else { "sidebar collapsed" };

    view! {
        <aside class=sidebar_class>
            <div class="sidebar-header">
                <button class="sidebar-toggle" title="Alternar menu" on:click=move |_| ctx.toggle_sidebar()>"☰"</button>
                <Show when=move || ctx.sidebar_open.get()>
                    <span class="sidebar-brand">"TDAH Companheiro"</span>
                </Show>
            </div>
            <nav class="sidebar-nav">
                {Page::NAVIGATION
                    .into_iter()
                    .map(|page| {
                        let is_active = move || ctx.page.get() == page;
                        view! {
                            <button
                                class=move || if is_active() { "nav-item active" } else { "nav-item" }
                                title=page.label()
                                on:click=move |_| ctx.navigate(page)
                            >
                                <span class="nav-icon">{page.icon()}</span>
                                <Show when=move || ctx.sidebar_open.get()>
                                    <span class="nav-label">{page.label()}</span>
                                </Show>
                            </button>
                        }
                    })
                    .collect_view()}
            </nav>
        </aside>
    }
}
