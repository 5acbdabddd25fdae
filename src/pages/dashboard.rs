//! Dashboard Page
//!
//! Greeting, child profiles and shortcuts to the per-child screens.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{ChildSelector, DeleteConfirmButton, ProfileForm};
use crate::context::AppContext;
use crate::models::{ChildProfile, Page};
use crate::store::{store_user_name, use_app_store, AppStateStoreFields};

/// Whole years between a `YYYY-MM-DD` birth date and today
fn age_in_years(birth: &str) -> Option<i32> {
    use chrono::Datelike;
    let birth = chrono::NaiveDate::parse_from_str(birth, "%Y-%m-%d").ok()?;
    let today = chrono::Local::now().date_naive();
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    Some(years.max(0))
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let (adding, set_adding) = signal(false);
    let (editing, set_editing) = signal(false);

    let has_profiles = move || !store.profiles().read().profiles.is_empty();
    let selected = move || store.profiles().read().selected().cloned();

    view! {
        <section class="dashboard">
            <h1>{move || format!("Olá, {}!", store_user_name(&store).unwrap_or_default())}</h1>
            <p class="page-subtitle">"Acompanhe a rotina, o diário e os lembretes de cada criança."</p>

            <Show
                when=has_profiles
                fallback=move || view! {
                    <div class="card empty-profile-card">
                        <h2>"Cadastre a primeira criança"</h2>
                        <p>"Para começar, adicione o perfil de uma criança."</p>
                        <ProfileForm on_done=Callback::new(|_: ()| ()) />
                    </div>
                }
            >
                <div class="dashboard-toolbar">
                    <ChildSelector />
                    <button class="secondary" on:click=move |_| set_adding.update(|v| *v = !*v)>
                        {move || if adding.get() { "Fechar" } else { "+ Nova criança" }}
                    </button>
                </div>

                <Show when=move || adding.get()>
                    <div class="card">
                        <h2>"Nova criança"</h2>
                        <ProfileForm on_done=Callback::new(move |_: ()| set_adding.set(false)) show_cancel=true />
                    </div>
                </Show>

                {move || selected().map(|profile| {
                    if editing.get() {
                        view! {
                            <div class="card">
                                <h2>"Editar perfil"</h2>
                                <ProfileForm
                                    editing=profile
                                    on_done=Callback::new(move |_: ()| set_editing.set(false))
                                    show_cancel=true
                                />
                            </div>
                        }.into_any()
                    } else {
                        view! { <ProfileCard profile=profile set_editing=set_editing /> }.into_any()
                    }
                })}

                <div class="quick-links">
                    {[Page::Routine, Page::Diary, Page::Reminders]
                        .into_iter()
                        .map(|page| view! {
                            <button class="quick-link card" on:click=move |_| ctx.navigate(page)>
                                <span class="quick-link-icon">{page.icon()}</span>
                                <span>{page.label()}</span>
                            </button>
                        })
                        .collect_view()}
                </div>
            </Show>
        </section>
    }
}

#[component]
fn ProfileCard(profile: ChildProfile, set_editing: WriteSignal<bool>) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let child_id = profile.child_id.clone();
    let name = profile.nome_crianca.clone();
    let on_delete = Callback::new(move |_: ()| {
        let services = ctx.services();
        let child_id = child_id.clone();
        let name = name.clone();
        spawn_local(async move {
            match services.delete_profile(&child_id).await {
                Ok(()) => {
                    ctx.success("Perfil excluído", format!("{} foi removido.", name));
                }
                Err(e) => {
                    ctx.error("Erro ao excluir perfil", e.to_string());
                }
            }
        });
    });

    let age = age_in_years(&profile.data_nascimento)
        .map(|years| format!("{} anos", years))
        .unwrap_or_default();
    let diagnosis = if profile.diagnostico_tdah {
        match profile.grau_tdah {
            Some(level) => format!("TDAH ({})", level.as_str()),
            None => "TDAH".to_string(),
        }
    } else {
        "Sem diagnóstico informado".to_string()
    };
    let notes = profile.informacoes_adicionais.clone();

    view! {
        <div class="card profile-card">
            <div class="profile-card-header">
                <h2>{profile.nome_crianca.clone()}</h2>
                <div class="profile-card-actions">
                    <button class="edit-btn" title="Editar" on:click=move |_| set_editing.set(true)>"✎"</button>
                    <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
                </div>
            </div>
            <p class="profile-meta">{age}" · "{diagnosis}</p>
            {notes.map(|n| view! { <p class="profile-notes">{n}</p> })}
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_rejects_bad_dates() {
        assert_eq!(age_in_years("not a date"), None);
        assert_eq!(age_in_years("2999-01-01"), Some(0));
    }
}
