//! Login Page

use leptos::prelude::*;
use leptos::task::spawn_local;

use companion_core::forms::LoginForm;

use crate::context::AppContext;
use crate::models::Page;
use crate::store::{use_app_store, AppStateStoreFields};

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let (form, set_form) = signal(LoginForm::default());
    let (error, set_error) = signal(None::<String>);

    let demo_mode = ctx.services().config().demo_mode;
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
            match services.sign_in(current.email.trim(), &current.password).await {
                Ok(session) => {
                    log::info!("[AUTH] Signed in as {}", session.user.id);
                    ctx.success("Login realizado", "Bem-vindo de volta!");
                    ctx.navigate(Page::Dashboard);
                }
                Err(e) => {
                    ctx.error("Erro ao entrar", e.to_string());
                }
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-card" on:submit=submit>
                <h1>"TDAH Companheiro"</h1>
                <p class="auth-subtitle">"Entre na sua conta"</p>
                <Show when=move || demo_mode>
                    <p class="demo-banner">"Modo demonstração: os dados ficam só nesta aba."</p>
                </Show>
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
                        autocomplete="current-password"
                        prop:value=move || form.get().password
                        on:input=move |ev| set_form.update(|f| f.password = event_target_value(&ev))
                    />
                </label>
                <Show when=move || error.get().is_some()>
                    <p class="form-error">{move || error.get().unwrap_or_default()}</p>
                </Show>
                <button type="submit" disabled=is_loading>
                    {move || if is_loading() { "Entrando..." } else { "Entrar" }}
                </button>
                <p class="auth-switch">
                    "Não tem uma conta? "
                    <a href="#" on:click=move |ev| {
                        ev.prevent_default();
                        ctx.navigate(Page::SignUp);
                    }>"Criar conta"</a>
                </p>
            </form>
        </div>
    }
}
