//! Task Positioning Operations
//!
//! Pure helpers for ordinal positions within one child's routine.

use serde_json::Value;

use crate::domain::Task;

/// Remove the element at `from` and reinsert it at `to`, shifting the
/// elements in between. Returns false (leaving `items` untouched) when
/// either index is out of range.
pub fn list_move<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let moved = items.remove(from);
        items.insert(to, moved);
    }
    true
}

/// Renumber `order` to match list positions (0, 1, 2, ...)
pub fn assign_positions(tasks: &mut [Task]) {
    for (position, task) in tasks.iter_mut().enumerate() {
        task.order = position as i32;
    }
}

/// Position for a task appended at the end
pub fn next_order(tasks: &[Task]) -> i32 {
    tasks.iter().map(|t| t.order).max().map_or(0, |max| max + 1)
}

/// `(id, order)` pairs for every task, in list order
pub fn position_updates(tasks: &[Task]) -> Vec<(String, Value)> {
    tasks.iter().map(|t| (t.id.clone(), Value::from(t.order))).collect()
}
