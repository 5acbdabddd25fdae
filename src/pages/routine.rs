//! Routine Page

use leptos::prelude::*;

use crate::components::{ChildSelector, TaskBoard};
use crate::store::{store_selected_child, use_app_store};

#[component]
pub fn RoutinePage() -> impl IntoView {
    let store = use_app_store();

    view! {
        <section class="routine-page">
            <div class="page-header">
                <h1>"Rotina"</h1>
                <ChildSelector />
            </div>
            <Show
                when=move || store_selected_child(&store).is_some()
                fallback=|| view! { <p class="empty-state">"Selecione ou cadastre uma criança no início."</p> }
            >
                <TaskBoard />
            </Show>
        </section>
    }
}
