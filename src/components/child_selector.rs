//! Child Selector Component
//!
//! Dropdown switching the active child profile for every per-child screen.

use leptos::prelude::*;

use crate::context::AppContext;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn ChildSelector() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let profiles = move || store.profiles().read().profiles.clone();
    let selected = move || store.profiles().read().selected_child_id.clone().unwrap_or_default();

    view! {
        <Show when=move || !store.profiles().read().profiles.is_empty()>
            <label class="child-selector">
                <span>"Criança:"</span>
                <select
                    prop:value=selected
                    on:change=move |ev| {
                        let id = event_target_value(&ev);
                        log::debug!("[APP] Select child {}", id);
                        ctx.services().select_child((!id.is_empty()).then_some(id.as_str()));
                    }
                >
                    <For
                        each=profiles
                        key=|p| (p.child_id.clone(), p.nome_crianca.clone())
                        children=move |p| {
                            view! { <option value=p.child_id.clone()>{p.nome_crianca.clone()}</option> }
                        }
                    />
                </select>
            </label>
        </Show>
    }
}
