//! Task Board Component
//!
//! Routine checklist of the selected child. Rows are reordered with
//! leptos-dragdrop; every gesture goes through the task list controller,
//! which applies it at once and reconciles with the backend.

use leptos::prelude::*;
use leptos::task::spawn_local;

use companion_core::forms::TaskForm;
use companion_core::routine::{FailureCause, Phase, TaskListError};

use crate::components::DeleteConfirmButton;
use crate::context::AppContext;
use crate::models::Task;
use crate::store::{store_selected_child, use_app_store, AppStateStoreFields};

use leptos_dragdrop::*;

/// Gestures abandoned because a reload replaced the list they were applied to
fn is_superseded(error: &TaskListError) -> bool {
    matches!(
        error,
        TaskListError::ReorderFailed(FailureCause::Superseded)
            | TaskListError::UpdateFailed(FailureCause::Superseded)
            | TaskListError::DeleteFailed(FailureCause::Superseded)
            | TaskListError::CreateFailed(FailureCause::Superseded)
    )
}

/// Toast for a failed task gesture. Superseded gestures are dropped quietly.
fn report(ctx: AppContext, title: &str, error: TaskListError) {
    if is_superseded(&error) {
        log::debug!("[TASKS] {}: {}", title, error);
        return;
    }
    log::warn!("[TASKS] {}: {}", title, error);
    ctx.error(title, error.to_string());
}

#[component]
pub fn TaskBoard() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");
    let store = use_app_store();

    let selected_child = Memo::new(move |_| store_selected_child(&store));

    // Load the board whenever the selected child changes
    Effect::new(move |_| {
        let Some(child_id) = selected_child.get() else {
            return;
        };
        let services = ctx.services();
        if services.tasks.active_child().as_deref() == Some(child_id.as_str()) && services.tasks.phase() != Phase::Uninitialized {
            return;
        }
        spawn_local(async move {
            if let Err(e) = services.tasks.load(&child_id).await {
                report(ctx, "Erro ao carregar tarefas", e);
            }
        });
    });

    let tasks = move || store.tasks().read().tasks.clone();
    let phase = move || store.tasks().read().phase;
    let progress = move || {
        let snapshot = store.tasks().read();
        let done = snapshot.tasks.iter().filter(|t| t.is_completed).count();
        (done, snapshot.tasks.len())
    };

    let dnd = create_dnd_signals();

    bind_global_mouseup(dnd, move |from, target| {
        let len = store.tasks().read_untracked().tasks.len();
        let Some(to) = target_index(from, target, len) else {
            log::debug!("[DND] Drop {:?} from {} is a no-op", target, from);
            return;
        };
        log::debug!("[DND] Move task {} -> {}", from, to);
        let services = ctx.services();
        spawn_local(async move {
            if let Err(e) = services.tasks.reorder(from, to).await {
                report(ctx, "Erro ao reordenar tarefas", e);
            }
        });
    });

    view! {
        <section class="task-board">
            <div class="task-board-header">
                <h2>"Rotina do dia"</h2>
                <span class="task-phase">
                    {move || match phase() {
                        Phase::Loading => "Carregando...",
                        Phase::Reconciling => "Salvando...",
                        _ => "",
                    }}
                </span>
            </div>

            <TaskProgress progress=Signal::derive(progress) />

            <NewTaskForm />

            <Show
                when=move || !tasks().is_empty()
                fallback=move || view! {
                    <p class="empty-state">
                        {move || if phase() == Phase::Loading { "" } else { "Nenhuma tarefa ainda. Adicione a primeira acima." }}
                    </p>
                }
            >
                <ul class="task-list">
                    <DropSlot dnd=dnd gap=0 />
                    <For
                        each=move || tasks().into_iter().enumerate()
                        // Index is part of the key so handlers bound to a row follow its position
                        key=|(index, task)| (*index, task.id.clone(), task.description.clone(), task.is_completed)
                        children=move |(index, task)| {
                            view! {
                                <TaskRow dnd=dnd index=index task=task />
                                <DropSlot dnd=dnd gap=index + 1 />
                            }
                        }
                    />
                </ul>
            </Show>
        </section>
    }
}

#[component]
fn TaskProgress(progress: Signal<(usize, usize)>) -> impl IntoView {
    let percent = move || {
        let (done, total) = progress.get();
        if total == 0 { 0 } else { done * 100 / total }
    };

    view! {
        <div class="task-progress">
            <div class="task-progress-bar">
                <div class="task-progress-fill" style=move || format!("width: {}%;", percent())></div>
            </div>
            <span class="task-progress-label">
                {move || {
                    let (done, total) = progress.get();
                    format!("{} de {} concluídas", done, total)
                }}
            </span>
        </div>
    }
}

#[component]
fn NewTaskForm() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let (description, set_description) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (adding, set_adding) = signal(false);

    let add_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = TaskForm { description: description.get_untracked() };
        let text = match form.validate() {
            Ok(text) => text,
            Err(e) => {
                set_error.set(Some(e.message));
                return;
            }
        };
        set_error.set(None);
        set_adding.set(true);

        let services = ctx.services();
        spawn_local(async move {
            match services.tasks.add_task(&text).await {
                Ok(task) => {
                    log::info!("[TASKS] Added {} at {}", task.id, task.order);
                    set_description.set(String::new());
                }
                Err(e) => report(ctx, "Erro ao adicionar tarefa", e),
            }
            set_adding.set(false);
        });
    };

    view! {
        <form class="task-add-form" on:submit=add_task>
            <input
                type="text"
                placeholder="Nova tarefa..."
                prop:value=move || description.get()
                on:input=move |ev| set_description.set(event_target_value(&ev))
            />
            <button type="submit" disabled=move || adding.get()>"Adicionar"</button>
            <Show when=move || error.get().is_some()>
                <p class="form-error">{move || error.get().unwrap_or_default()}</p>
            </Show>
        </form>
    }
}

/// A single routine row
#[component]
fn TaskRow(dnd: DndSignals, index: usize, task: Task) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext should be provided");

    let id = task.id.clone();
    let completed = task.is_completed;

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(task.description.clone());

    // DnD handlers
    let on_mousedown = make_on_mousedown(dnd, index);
    let on_mouseenter = make_on_row_mouseenter(dnd, index);
    let on_mouseleave = make_on_mouseleave(dnd);

    // Visual state
    let is_dragging = move || dnd.dragging_index_read.get() == Some(index);
    let is_drop_target = move || matches!(dnd.drop_target_read.get(), Some(DropTarget::Row(i)) if i == index);

    let row_class = move || {
        let mut c = String::from("task-row");
        if completed { c.push_str(" completed"); }
        if is_dragging() { c.push_str(" dragging"); }
        if is_drop_target() { c.push_str(" drop-target"); }
        c
    };

    let toggle_id = id.clone();
    let toggle = move |_| {
        let services = ctx.services();
        let task_id = toggle_id.clone();
        spawn_local(async move {
            if let Err(e) = services.tasks.toggle_completion(&task_id).await {
                report(ctx, "Erro ao atualizar tarefa", e);
            }
        });
    };

    let save_id = id.clone();
    let original = task.description.clone();
    let save = move || {
        let text = draft.get_untracked();
        set_editing.set(false);
        if text.trim() == original.trim() {
            return;
        }
        let services = ctx.services();
        let task_id = save_id.clone();
        spawn_local(async move {
            if let Err(e) = services.tasks.update_description(&task_id, &text).await {
                report(ctx, "Erro ao editar tarefa", e);
            }
        });
    };
    let save_on_key = save.clone();

    let delete_id = id.clone();
    let on_delete = Callback::new(move |_: ()| {
        let services = ctx.services();
        let task_id = delete_id.clone();
        spawn_local(async move {
            if let Err(e) = services.tasks.delete_task(&task_id).await {
                report(ctx, "Erro ao excluir tarefa", e);
            }
        });
    });

    let description = task.description.clone();

    view! {
        <li
            class=row_class
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <span class="drag-handle" title="Arraste para reordenar">"⋮⋮"</span>
            <input type="checkbox" checked=completed on:change=toggle />
            <Show
                when=move || editing.get()
                fallback={
                    let description = description.clone();
                    move || {
                        let text = description.clone();
                        view! {
                            <span
                                class="task-text"
                                on:dblclick=move |_| {
                                    if !dnd.drag_just_ended_read.get_untracked() {
                                        set_editing.set(true);
                                    }
                                }
                            >
                                {text}
                            </span>
                        }
                    }
                }
            >
                <input
                    class="task-edit-input"
                    type="text"
                    prop:value=move || draft.get()
                    on:input=move |ev| set_draft.set(event_target_value(&ev))
                    on:keydown={
                        let save_on_key = save_on_key.clone();
                        move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                            "Enter" => save_on_key(),
                            "Escape" => set_editing.set(false),
                            _ => {}
                        }
                    }
                />
                <button class="save-btn" on:click={
                    let save = save.clone();
                    move |_| save()
                }>"✓"</button>
            </Show>
            <button class="edit-btn" title="Editar" on:click=move |_| set_editing.set(true)>"✎"</button>
            <DeleteConfirmButton button_class="delete-btn" on_confirm=on_delete />
        </li>
    }
}

/// Gap before row `gap` that accepts drops while a drag is in progress
#[component]
fn DropSlot(dnd: DndSignals, gap: usize) -> impl IntoView {
    let on_mouseenter = make_on_slot_mouseenter(dnd, gap);
    let on_mouseleave = make_on_mouseleave(dnd);

    let is_active = move || matches!(dnd.drop_target_read.get(), Some(DropTarget::Slot(g)) if g == gap);
    let is_dragging = move || dnd.dragging_index_read.get().is_some();

    let slot_class = move || {
        let mut c = String::from("drop-slot");
        if !is_dragging() { c.push_str(" hidden"); }
        if is_active() { c.push_str(" active"); }
        c
    };

    view! {
        <li class=slot_class on:mouseenter=on_mouseenter on:mouseleave=on_mouseleave />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_superseded_gestures_are_silent() {
        assert!(is_superseded(&TaskListError::ReorderFailed(FailureCause::Superseded)));
        assert!(is_superseded(&TaskListError::DeleteFailed(FailureCause::Superseded)));
        assert!(!is_superseded(&TaskListError::UpdateFailed(FailureCause::Missing)));
        assert!(!is_superseded(&TaskListError::NoActiveChild));
    }
}
