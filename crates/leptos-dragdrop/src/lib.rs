//! Leptos DragDrop Utilities
//!
//! Mouse-event drag-and-drop for flat reorderable lists.
//! Uses a movement threshold to distinguish click from drag.

use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// Drop target types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Drop on a row (take its place)
    Row(usize),
    /// Drop into the gap before row `n` (`n == len` is the gap after the last row)
    Slot(usize),
}

/// DnD state signals
#[derive(Clone, Copy)]
pub struct DndSignals {
    pub dragging_index_read: ReadSignal<Option<usize>>,
    pub dragging_index_write: WriteSignal<Option<usize>>,
    pub drop_target_read: ReadSignal<Option<DropTarget>>,
    pub drop_target_write: WriteSignal<Option<DropTarget>>,
    pub drag_just_ended_read: ReadSignal<bool>,
    pub drag_just_ended_write: WriteSignal<bool>,
    /// Pending row (mousedown but not yet dragging)
    pub pending_index_read: ReadSignal<Option<usize>>,
    pub pending_index_write: WriteSignal<Option<usize>>,
    /// Start position for movement detection
    pub start_x_read: ReadSignal<i32>,
    pub start_x_write: WriteSignal<i32>,
    pub start_y_read: ReadSignal<i32>,
    pub start_y_write: WriteSignal<i32>,
}

/// Movement threshold in pixels to start dragging
const DRAG_THRESHOLD_PX: i32 = 5;

/// How long clicks are suppressed after a drop, in milliseconds
const JUST_ENDED_MS: i32 = 100;

pub fn create_dnd_signals() -> DndSignals {
    let (dragging_index_read, dragging_index_write) = signal(None::<usize>);
    let (drop_target_read, drop_target_write) = signal(None::<DropTarget>);
    let (drag_just_ended_read, drag_just_ended_write) = signal(false);
    let (pending_index_read, pending_index_write) = signal(None::<usize>);
    let (start_x_read, start_x_write) = signal(0i32);
    let (start_y_read, start_y_write) = signal(0i32);
    DndSignals {
        dragging_index_read,
        dragging_index_write,
        drop_target_read,
        drop_target_write,
        drag_just_ended_read,
        drag_just_ended_write,
        pending_index_read,
        pending_index_write,
        start_x_read,
        start_x_write,
        start_y_read,
        start_y_write,
    }
}

/// Final position of the row dragged from `from` when dropped on `target`,
/// in a list of `len` rows. `None` when the drop would not move anything.
pub fn target_index(from: usize, target: DropTarget, len: usize) -> Option<usize> {
    if from >= len {
        return None;
    }
    let to = match target {
        DropTarget::Row(row) if row < len => row,
        DropTarget::Row(_) => return None,
        // Removing the dragged row shifts every later gap up by one
        DropTarget::Slot(gap) if gap > from => gap.min(len) - 1,
        DropTarget::Slot(gap) => gap,
    };
    (to != from).then_some(to)
}

/// True while a drag beyond the threshold is in progress
pub fn moved_past_threshold(start: (i32, i32), now: (i32, i32)) -> bool {
    (now.0 - start.0).abs() > DRAG_THRESHOLD_PX || (now.1 - start.1).abs() > DRAG_THRESHOLD_PX
}

/// End drag operation
pub fn end_drag(dnd: &DndSignals) {
    dnd.dragging_index_write.set(None);
    dnd.drop_target_write.set(None);
    dnd.pending_index_write.set(None);
    dnd.drag_just_ended_write.set(true);

    if let Some(win) = web_sys::window() {
        let clear = dnd.drag_just_ended_write;
        let cb = wasm_bindgen::closure::Closure::<dyn FnMut()>::new(move || {
            clear.set(false);
        });
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), JUST_ENDED_MS);
        cb.forget();
    }
}

/// Create mousedown handler for draggable rows
/// Records pending drag with start position
pub fn make_on_mousedown(dnd: DndSignals, index: usize) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |ev: web_sys::MouseEvent| {
        if ev.button() == 0 {
            // Checkboxes and buttons inside the row keep their own clicks
            if let Some(target) = ev.target() {
                if target.dyn_ref::<web_sys::HtmlInputElement>().is_some() { return; }
                if target.dyn_ref::<web_sys::HtmlButtonElement>().is_some() { return; }
            }
            dnd.pending_index_write.set(Some(index));
            dnd.start_x_write.set(ev.client_x());
            dnd.start_y_write.set(ev.client_y());
        }
    }
}

/// Document mousemove handler - starts drag if moved enough
fn bind_global_mousemove(dnd: DndSignals) {
    use wasm_bindgen::closure::Closure;

    let on_mousemove = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |ev: web_sys::MouseEvent| {
        let pending = dnd.pending_index_read.get_untracked();
        if pending.is_some() && dnd.dragging_index_read.get_untracked().is_none() {
            let start = (dnd.start_x_read.get_untracked(), dnd.start_y_read.get_untracked());
            if moved_past_threshold(start, (ev.client_x(), ev.client_y())) {
                dnd.dragging_index_write.set(pending);
            }
        }
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mousemove", on_mousemove.as_ref().unchecked_ref());
        }
    }
    on_mousemove.forget();
}

/// Create mouseenter handler for rows
pub fn make_on_row_mouseenter(dnd: DndSignals, index: usize) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if let Some(dragging) = dnd.dragging_index_read.get_untracked() {
            // Don't allow dropping on self
            if dragging != index {
                dnd.drop_target_write.set(Some(DropTarget::Row(index)));
            }
        }
    }
}

/// Create mouseenter handler for the gap before row `gap`
pub fn make_on_slot_mouseenter(dnd: DndSignals, gap: usize) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_index_read.get_untracked().is_some() {
            dnd.drop_target_write.set(Some(DropTarget::Slot(gap)));
        }
    }
}

/// Create mouseleave handler
pub fn make_on_mouseleave(dnd: DndSignals) -> impl Fn(web_sys::MouseEvent) + Copy + 'static {
    move |_ev: web_sys::MouseEvent| {
        if dnd.dragging_index_read.get_untracked().is_some() {
            dnd.drop_target_write.set(None);
        }
    }
}

/// Bind global mouseup handler for drop detection. `on_drop` receives the
/// dragged row's index and where it was released.
pub fn bind_global_mouseup<F>(dnd: DndSignals, on_drop: F)
where
    F: Fn(usize, DropTarget) + Clone + 'static,
{
    use wasm_bindgen::closure::Closure;

    let on_mouseup = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_ev: web_sys::MouseEvent| {
        let dragging = dnd.dragging_index_read.get_untracked();
        let drop_target = dnd.drop_target_read.get_untracked();

        dnd.pending_index_write.set(None);

        if let (Some(dragged), Some(target)) = (dragging, drop_target) {
            end_drag(&dnd);
            on_drop(dragged, target);
        } else if dragging.is_some() {
            end_drag(&dnd);
        }
        // Plain clicks fall through to the element's own handler
    });

    if let Some(win) = web_sys::window() {
        if let Some(doc) = win.document() {
            let _ = doc.add_event_listener_with_callback("mouseup", on_mouseup.as_ref().unchecked_ref());
        }
    }
    on_mouseup.forget();

    bind_global_mousemove(dnd);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_after_source_shifts_up() {
        // [A,B,C]: A dropped after C -> index 2
        assert_eq!(target_index(0, DropTarget::Slot(3), 3), Some(2));
        // A dropped between B and C -> index 1
        assert_eq!(target_index(0, DropTarget::Slot(2), 3), Some(1));
    }

    #[test]
    fn test_slot_before_source() {
        assert_eq!(target_index(2, DropTarget::Slot(0), 3), Some(0));
        assert_eq!(target_index(2, DropTarget::Slot(1), 3), Some(1));
    }

    #[test]
    fn test_gaps_around_source_are_noops() {
        assert_eq!(target_index(1, DropTarget::Slot(1), 3), None);
        assert_eq!(target_index(1, DropTarget::Slot(2), 3), None);
        assert_eq!(target_index(1, DropTarget::Row(1), 3), None);
    }

    #[test]
    fn test_row_targets() {
        assert_eq!(target_index(0, DropTarget::Row(2), 3), Some(2));
        assert_eq!(target_index(0, DropTarget::Row(3), 3), None);
        assert_eq!(target_index(4, DropTarget::Row(0), 3), None);
    }

    #[test]
    fn test_threshold() {
        assert!(!moved_past_threshold((10, 10), (15, 5)));
        assert!(moved_past_threshold((10, 10), (16, 10)));
    }
}
