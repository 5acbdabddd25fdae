//! Delete Confirm Button Component
//!
//! Inline two-step delete: the trash button turns into "Excluir?" with
//! confirm/cancel.

use leptos::prelude::*;

/// Inline delete confirmation button
///
/// # Arguments
/// * `button_class` - CSS class for the initial button
/// * `disabled` - Disables both steps, e.g. while a request is in flight
/// * `on_confirm` - Runs when the user confirms
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into, optional)] disabled: MaybeProp<bool>,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let (confirm_delete, set_confirm_delete) = signal(false);

    view! {
        <Show
            when=move || confirm_delete.get()
            fallback=move || view! {
                <button
                    class=button_class.clone()
                    title="Excluir"
                    disabled=move || disabled.get().unwrap_or(false)
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirm_delete.set(true);
                    }
                >
                    "🗑"
                </button>
            }
        >
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Excluir?"</span>
                <button
                    class="confirm-btn"
                    disabled=move || disabled.get().unwrap_or(false)
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirm_delete.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirm_delete.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
