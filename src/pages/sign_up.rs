//! Sign-Up Page

use leptos::prelude::*;
use leptos::task::spawn_local;

use companion_core::domain::SignUpOutcome;
use companion_core::forms::SignUpForm;

use crate::context::AppContext;
use crate::models::Page;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn SignUpPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let (form, set_form) = signal(SignUpForm::default());
    let (error, set_error) = signal(None::<String>);

    let is_loading = move || store.auth().read().is_loading;

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let current = form.get_untracked();
        if let Err(e) = current.validate() {
            set_error.set(Some(e.message));
            return;
        }
        set_error.set(None);
        let services = ctx.services();
        spawn_local(async move {
            let full_name = current.full_name.trim().to_string();
            match services.sign_up(current.email.trim(), &current.password, Some(&full_name)).await {
                Ok(SignUpOutcome::SignedIn(_)) => {
                    ctx.success("Conta criada", "Sua conta foi criada com sucesso.");
                    ctx.navigate(Page::Dashboard);
                }
                Ok(SignUpOutcome::ConfirmationRequired(_)) => {
                    ctx.success("Verifique seu e-mail", "Enviamos um link de confirmação. Depois é só entrar.");
                    ctx.navigate(Page::Login);
                }
                Err(e) => {
                    ctx.error("Erro ao criar conta", e.to_string());
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-card" on:submit=submit>
                <h1>"Criar conta"</h1>
                <label>
                    "Nome completo"
                    <input
                        type="text"
                        autocomplete="name"
                        prop:value=move || form.get().full_name
                        on:input=move |ev| set_form.update(|f| f.full_name = event_target_value(&ev))
                    />
                </label>
                <label>
                    "E-mail"
                    <input
                        type="email"
                        autocomplete="email"
                        prop:value=move || form.get().email
                        on:input=move |ev| set_form.update(|f| f.email = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Senha"
                    <input
                        type="password"
                        autocomplete="new-password"
                        prop:value=move || form.get().password
                        on:input=move |ev| set_form.update(|f| f.password = event_target_value(&ev))
                    />
                </label>
                <label>
                    "Confirmar senha"
                    <input
                        type="password"
                        autocomplete="new-password"
                        prop:value=move || form.get().confirm_password
                        on:input=move |ev| set_form.update(|f| f.confirm_password = event_target_value(&ev))
                    />
                </label>
                <Show when=move || error.get().is_some()>
                    <p class="form-error">{move || error.get().unwrap_or_default()}</p>
                </Show>
                <button type="submit" disabled=is_loading>
                    {move || if is_loading() { "Criando..." } else { "Criar conta" }}
                </button>
                <p class="auth-switch">
                    "Já tem uma conta? "
                    <a href="#" on:click=move |ev| {
                        ev.prevent_default();
                        ctx.navigate(Page::Login);
                    }>"Entrar"</a>
                </p>
            </form>
        </div>
    }
}
