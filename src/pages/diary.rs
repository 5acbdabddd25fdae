//! Diary Page
//!
//! Daily notes about the selected child: mood, medication and what the
//! parents observed. Newest entries first.

use leptos::prelude::*;
use leptos::task::spawn_local;

use companion_core::forms::DiaryEntryForm;

use crate::components::{ChildSelector, DeleteConfirmButton};
use crate::context::AppContext;
use crate::models::{DiaryEntry, MedicationTaken};
use crate::store::{store_selected_child, use_app_store, AppStateStoreFields};

const MOODS: [&str; 5] = ["Muito bem", "Bem", "Neutro", "Agitado", "Difícil"];

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

#[component]
pub fn DiaryPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let selected_child = Memo::new(move |_| store_selected_child(&store));

    // Reload when the selected child changes
    Effect::new(move |_| {
        if selected_child.get().is_none() {
            return;
        }
        let services = ctx.services();
        spawn_local(async move {
            if let Err(e) = services.diary.load().await {
                log::warn!("[DIARY] Load failed: {}", e);
                ctx.error("Erro ao carregar diário", e.to_string());
            }
        });
    });

    let entries = move || store.diary().read().items.clone();
    let is_loading = move || store.diary().read().is_loading;

    view! {
        <section class="diary-page">
            <div class="page-header">
                <h1>"Diário"</h1>
                <ChildSelector />
            </div>
            <Show
                when=move || selected_child.get().is_some()
                fallback=|| view! { <p class="empty-state">"Selecione ou cadastre uma criança no início."</p> }
            >
                <DiaryForm />
                <Show
                    when=move || !entries().is_empty()
                    fallback=move || view! {
                        <p class="empty-state">
                            {move || if is_loading() { "Carregando..." } else { "Nenhum registro ainda." }}
                        </p>
                    }
                >
                    <ul class="diary-list">
                        <For
                            each=entries
                            key=|e| e.id.clone()
                            children=move |entry| view! { <DiaryEntryCard entry=entry /> }
                        />
                    </ul>
                </Show>
            </Show>
        </section>
    }
}

#[component]
fn DiaryForm() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (form, set_form) = signal(DiaryEntryForm::new(today()));
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
        spawn_local(async move {
            match services.diary.create(&new).await {
                Ok(_) => {
                    ctx.success("Registro salvo", "O diário foi atualizado.");
                    set_form.set(DiaryEntryForm::new(today()));
                }
                Err(e) => {
                    ctx.error("Erro ao salvar registro", e.to_string());
                }
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="card diary-form" on:submit=submit>
            <h2>"Novo registro"</h2>
            <label>
                "Data"
                <input
                    type="date"
                    prop:value=move || form.get().entry_date
                    on:input=move |ev| set_form.update(|f| f.entry_date = event_target_value(&ev))
                />
            </label>
            <label>
                "Humor"
                <select
                    prop:value=move || form.get().mood
                    on:change=move |ev| set_form.update(|f| f.mood = event_target_value(&ev))
                >
                    <option value="">"Selecione..."</option>
                    {MOODS.into_iter().map(|m| view! { <option value=m>{m}</option> }).collect_view()}
                </select>
            </label>
            <label>
                "Comportamento"
                <textarea
                    prop:value=move || form.get().behavior_observations
                    on:input=move |ev| set_form.update(|f| f.behavior_observations = event_target_value(&ev))
                />
            </label>
            <label>
                "Tomou a medicação?"
                <select
                    prop:value=move || form.get().medication_taken
                    on:change=move |ev| set_form.update(|f| f.medication_taken = event_target_value(&ev))
                >
                    {[MedicationTaken::Sim, MedicationTaken::Nao, MedicationTaken::NaoAplica]
                        .into_iter()
                        .map(|m| view! { <option value=m.as_str()>{m.label()}</option> })
                        .collect_view()}
                </select>
            </label>
            <Show when=move || form.get().medication_taken == MedicationTaken::Sim.as_str()>
                <label>
                    "Detalhes da medicação"
                    <input
                        type="text"
                        prop:value=move || form.get().medication_details
                        on:input=move |ev| set_form.update(|f| f.medication_details = event_target_value(&ev))
                    />
                </label>
            </Show>
            <label>
                "Destaques do dia"
                <textarea
                    prop:value=move || form.get().activities_highlights
                    on:input=move |ev| set_form.update(|f| f.activities_highlights = event_target_value(&ev))
                />
            </label>
            <label>
                "Observações dos pais"
                <textarea
                    prop:value=move || form.get().parent_observations
                    on:input=move |ev| set_form.update(|f| f.parent_observations = event_target_value(&ev))
                />
            </label>
            <Show when=move || error.get().is_some()>
                <p class="form-error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <button type="submit" disabled=move || saving.get()>
                {move || if saving.get() { "Salvando..." } else { "Salvar registro" }}
            </button>
        </form>
    }
}

#[component]
fn DiaryEntryCard(entry: DiaryEntry) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let id = entry.id.clone();
    let on_delete = Callback::new(move |_: ()| {
        let services = ctx.services();
        let id = id.clone();
        spawn_local(async move {
            if let Err(e) = services.diary.delete(&id).await {
                ctx.error("Erro ao excluir registro", e.to_string());
            }
        });
    });

    let date = chrono::NaiveDate::parse_from_str(&entry.entry_date, "%Y-%m-%d")
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| entry.entry_date.clone());
    let medication = match &entry.medication_details {
        Some(details) if entry.medication_taken == MedicationTaken::Sim => format!("Sim ({})", details),
        _ => entry.medication_taken.label().to_string(),
    };

    view! {
        <li class="card diary-entry">
            <div class="diary-entry-header">
                <strong>{date}</strong>
                <span class="diary-mood">{entry.mood.clone()}</span>
                <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
            </div>
            <p><span class="field-label">"Medicação: "</span>{medication}</p>
            {entry.behavior_observations.clone().map(|text| view! {
                <p><span class="field-label">"Comportamento: "</span>{text}</p>
            })}
            {entry.activities_highlights.clone().map(|text| view! {
                <p><span class="field-label">"Destaques: "</span>{text}</p>
            })}
            <p><span class="field-label">"Observações: "</span>{entry.parent_observations.clone()}</p>
        </li>
    }
}
