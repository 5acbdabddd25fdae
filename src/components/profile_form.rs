//! Child Profile Form Component
//!
//! Create a child profile, or edit one when `editing` is set.

use leptos::prelude::*;
use leptos::task::spawn_local;

use companion_core::forms::ChildProfileForm;

use crate::context::AppContext;
use crate::models::{AdhdLevel, ChildProfile};

#[component]
pub fn ProfileForm(
    /// Profile being edited; `None` creates a new one
    #[prop(optional)] editing: Option<ChildProfile>,
    /// Runs after a successful save or on cancel
    #[prop(into)] on_done: Callback<()>,
    #[prop(optional)] show_cancel: bool,
) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let editing_id = editing.as_ref().map(|p| p.child_id.clone());
    let is_edit = editing_id.is_some();
    let initial = editing.as_ref().map(ChildProfileForm::from_profile).unwrap_or_default();

    let (form, set_form) = signal(initial);
    let (error, set_error) = signal(None::<String>);
    let (saving, set_saving) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let current = form.get_untracked();
        let services = ctx.services();
        let editing_id = editing_id.clone();

        let outcome = match &editing_id {
            Some(_) => current.validate_patch().map(|p| (None, Some(p))),
            None => current.validate().map(|n| (Some(n), None)),
        };
        let (new, patch) = match outcome {
            Ok(parts) => parts,
            Err(e) => {
                set_error.set(Some(e.message));
                return;
            }
        };
        set_error.set(None);
        set_saving.set(true);

        spawn_local(async move {
            let result = match (editing_id, new, patch) {
                (Some(id), _, Some(patch)) => services.update_profile(&id, &patch).await,
                (_, Some(new), _) => services.add_profile(&new).await,
                _ => {
                    set_saving.set(false);
                    return;
                }
            };
            set_saving.set(false);
            match result {
                Ok(profile) => {
                    log::info!("[PROFILE] Saved {}", profile.child_id);
                    ctx.success("Perfil salvo", format!("{} foi salvo com sucesso.", profile.nome_crianca));
                    if !is_edit {
                        set_form.set(ChildProfileForm::default());
                    }
                    on_done.run(());
                }
                Err(e) => {
                    ctx.error("Erro ao salvar perfil", e.to_string());
                }
            }
        });
    };

    view! {
        <form class="profile-form" on:submit=submit>
            <label>
                "Nome da criança"
                <input
                    type="text"
                    prop:value=move || form.get().nome_crianca
                    on:input=move |ev| set_form.update(|f| f.nome_crianca = event_target_value(&ev))
                />
            </label>
            <label>
                "Data de nascimento"
                <input
                    type="date"
                    prop:value=move || form.get().data_nascimento
                    on:input=move |ev| set_form.update(|f| f.data_nascimento = event_target_value(&ev))
                />
            </label>
            <label class="checkbox-label">
                <input
                    type="checkbox"
                    prop:checked=move || form.get().diagnostico_tdah
                    on:change=move |ev| set_form.update(|f| f.diagnostico_tdah = event_target_checked(&ev))
                />
                "Possui diagnóstico de TDAH"
            </label>
            <Show when=move || form.get().diagnostico_tdah>
                <label>
                    "Grau"
                    <select
                        prop:value=move || form.get().grau_tdah
                        on:change=move |ev| set_form.update(|f| f.grau_tdah = event_target_value(&ev))
                    >
                        <option value="">"Não informado"</option>
                        {[AdhdLevel::Leve, AdhdLevel::Moderado, AdhdLevel::Severo]
                            .into_iter()
                            .map(|level| view! { <option value=level.as_str()>{level.as_str()}</option> })
                            .collect_view()}
                    </select>
                </label>
            </Show>
            <label>
                "Informações adicionais"
                <textarea
                    prop:value=move || form.get().informacoes_adicionais
                    on:input=move |ev| set_form.update(|f| f.informacoes_adicionais = event_target_value(&ev))
                />
            </label>
            <Show when=move || error.get().is_some()>
                <p class="form-error">{move || error.get().unwrap_or_default()}</p>
            </Show>
            <div class="form-actions">
                <button type="submit" disabled=move || saving.get()>
                    {move || match (saving.get(), is_edit) {
                        (true, _) => "Salvando...",
                        (false, true) => "Salvar alterações",
                        (false, false) => "Adicionar perfil",
                    }}
                </button>
                <Show when=move || show_cancel>
                    <button type="button" class="secondary" on:click=move |_| on_done.run(())>"Cancelar"</button>
                </Show>
            </div>
        </form>
    }
}
