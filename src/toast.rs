//! Toast Notifications
//!
//! Short success/error messages stacked in a corner and dismissed after a
//! few seconds.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::AppContext;

/// How long a toast stays on screen
const TOAST_DURATION_MS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

/// Dismiss toast `id` once its time is up
pub fn schedule_dismiss(ctx: AppContext, id: u32) {
    spawn_local(async move {
        TimeoutFuture::new(TOAST_DURATION_MS).await;
        ctx.dismiss(id);
    });
}

#[component]
pub fn ToastViewport() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    view! {
        <div class="toast-viewport">
            <For
                each=move || ctx.toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    schedule_dismiss(ctx, id);
                    let class = match toast.kind {
                        ToastKind::Success => "toast toast-success",
                        ToastKind::Destructive => "toast toast-destructive",
                    };
                    view! {
                        <div class=class role="status">
                            <div class="toast-body">
                                <strong class="toast-title">{toast.title.clone()}</strong>
                                <Show when={
                                    let has_description = !toast.description.is_empty();
                                    move || has_description
                                }>
                                    <p class="toast-description">{toast.description.clone()}</p>
                                </Show>
                            </div>
                            <button class="toast-close" on:click=move |_| ctx.dismiss(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
