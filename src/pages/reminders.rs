//! Reminders Page
//!
//! Medication, appointment and activity reminders for the selected child.

use chrono::{DateTime, Local};
use leptos::prelude::*;
use leptos::task::spawn_local;

use companion_core::domain::ReminderPatch;
use companion_core::forms::ReminderForm;

use crate::components::{ChildSelector, DeleteConfirmButton};
use crate::context::AppContext;
use crate::models::{Reminder, ReminderType};
use crate::store::{store_selected_child, use_app_store, AppStateStoreFields};

fn blank_form() -> ReminderForm {
    ReminderForm::new(Local::now().date_naive())
}

/// `dd/mm/yyyy HH:MM` in the browser's time zone
fn format_when(reminder_time: &str) -> String {
    DateTime::parse_from_rfc3339(reminder_time)
        .map(|t| t.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|_| reminder_time.to_string())
}

#[component]
pub fn RemindersPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let selected_child = Memo::new(move |_| store_selected_child(&store));
    // Reminder being edited in the form, if any
    let (editing, set_editing) = signal(None::<Reminder>);

    Effect::new(move |_| {
        if selected_child.get().is_none() {
            return;
        }
        set_editing.set(None);
        let services = ctx.services();
        spawn_local(async move {
            if let Err(e) = services.reminders.load().await {
                log::warn!("[REMINDERS] Load failed: {}", e);
                ctx.error("Erro ao carregar lembretes", e.to_string());
            }
        });
    });

    let reminders = move || store.reminders().read().items.clone();
    let is_loading = move || store.reminders().read().is_loading;

    view! {
        <section class="reminders-page">
            <div class="page-header">
                <h1>"Lembretes"</h1>
                <ChildSelector />
            </div>
            <Show
                when=move || selected_child.get().is_some()
                fallback=|| view! { <p class="empty-state">"Selecione ou cadastre uma criança no início."</p> }
            >
                // Re-mount the form whenever the edit target changes
                {move || view! { <ReminderEditor editing=editing.get() set_editing=set_editing /> }}
                <Show
                    when=move || !reminders().is_empty()
                    fallback=move || view! {
                        <p class="empty-state">
                            {move || if is_loading() { "Carregando..." } else { "Nenhum lembrete cadastrado." }}
                        </p>
                    }
                >
                    <ul class="reminder-list">
                        <For
                            each=reminders
                            key=|r| (r.id.clone(), r.title.clone(), r.reminder_time.clone(), r.is_completed)
                            children=move |reminder| view! { <ReminderRow reminder=reminder set_editing=set_editing /> }
                        />
                    </ul>
                </Show>
            </Show>
        </section>
    }
}

#[component]
fn ReminderEditor(editing: Option<Reminder>, set_editing: WriteSignal<Option<Reminder>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let editing_id = editing.as_ref().map(|r| r.id.clone());
    let is_edit = editing_id.is_some();
    let initial = editing
        .as_ref()
        .map(|r| ReminderForm::from_reminder(r, *Local::now().offset()))
        .unwrap_or_else(blank_form);

    let (form, set_form) = signal(initial);
    let (error, set_error) = signal(None::<String>);
    let (saving, set_saving) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let new = match form.get_untracked().validate() {
            Ok(new) => new,
            Err(e) => {
                set_error.set(Some(e.message));
                return;
            }
        };
        set_error.set(None);
        set_saving.set(true);
        let services = ctx.services();
        let editing_id = editing_id.clone();
        spawn_local(async move {
            let result = match editing_id {
                Some(id) => services.reminders.update(&id, &ReminderPatch::from(new)).await,
                None => services.reminders.create(&new).await,
            };
            set_saving.set(false);
            match result {
                Ok(reminder) => {
                    log::info!("[REMINDERS] Saved {}", reminder.id);
                    ctx.success("Lembrete salvo", reminder.title.clone());
                    if is_edit {
                        set_editing.set(None);
                    } else {
                        set_form.set(blank_form());
                    }
                }
                Err(e) => {
                    log::warn!("[REMINDERS] Save failed: {}", e);
                    ctx.error("Erro ao salvar lembrete", e.to_string());
                }
            }
        });
    };

    view! {
        <form class="card reminder-form" on:submit=submit>
            <h2>{if is_edit { "Editar lembrete" } else { "Novo lembrete" }}</h2>
            <label>
                "Título"
                <input
                    type="text"
                    prop:value=move || form.get().title
                    on:input=move |ev| set_form.update(|f| f.title = event_target_value(&ev))
                />
            </label>
            <label>
                "Descrição"
                <textarea
                    prop:value=move || form.get().description
                    on:input=move |ev| set_form.update(|f| f.description = event_target_value(&ev))
                />
            </label>
            <div class="form-row">
                <label>
                    "Data"
                    <input
                        type="date"
                        prop:value=move || form.get().date
                        on:input=move |ev| set_form.update(|f| f.date = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Hora"
                    <input
                        type="time"
                        prop:value=move || form.get().time
                        on:input=move |ev| set_form.update(|f| f.time = event_target_value(&ev))
                    />
                </label>
            </div>
            <label>
                "Tipo"
                <select
                    prop:value=move || form.get().kind
                    on:change=move |ev| set_form.update(|f| f.kind = event_target_value(&ev))
                >
                    {ReminderType::ALL
                        .into_iter()
                        .map(|t| view! { <option value=t.as_str()>{t.label()}</option> })
                        .collect_view()}
                </select>
            </label>
            <Show when=move || error.get().is_some()>
                <p class="form-error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <div class="form-actions">
                <button type="submit" disabled=move || saving.get()>
                    {move || if saving.get() { "Salvando..." } else { "Salvar lembrete" }}
                </button>
                <Show when=move || is_edit>
                    <button type="button" class="secondary" on:click=move |_| set_editing.set(None)>"Cancelar"</button>
                </Show>
            </div>
        </form>
    }
}

#[component]
fn ReminderRow(reminder: Reminder, set_editing: WriteSignal<Option<Reminder>>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let completed = reminder.is_completed;

    let toggle_id = reminder.id.clone();
    let toggle = move |_| {
        let services = ctx.services();
        let id = toggle_id.clone();
        spawn_local(async move {
            if let Err(e) = services.reminders.toggle_completed(&id).await {
                ctx.error("Erro ao atualizar lembrete", e.to_string());
            }
        });
    };

    let delete_id = reminder.id.clone();
    let on_delete = Callback::new(move |_: ()| {
        let services = ctx.services();
        let id = delete_id.clone();
        spawn_local(async move {
            if let Err(e) = services.reminders.delete(&id).await {
                ctx.error("Erro ao excluir lembrete", e.to_string());
            }
        });
    });

    let for_edit = reminder.clone();

    view! {
        <li class={if completed { "card reminder-row completed" } else { "card reminder-row" }}>
            <input type="checkbox" checked=completed on:change=toggle />
            <div class="reminder-body">
                <strong>{reminder.title.clone()}</strong>
                <span class="reminder-meta">
                    {format_when(&reminder.reminder_time)}" · "{reminder.kind.label()}
                </span>
                {reminder.description.clone().map(|d| view! { <p class="reminder-description">{d}</p> })}
            </div>
            <button class="edit-btn" title="Editar" on:click=move |_| set_editing.set(Some(for_edit.clone()))>"✎"</button>
            <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
        </li>
    }
}
