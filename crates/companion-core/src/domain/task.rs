//! Routine Task Entity
//!
//! One step of a child's daily routine board.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::entity::Entity;

/// A routine task as stored in `routine_tasks`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the backend
    pub id: String,
    /// Owner (authenticated parent/guardian)
    pub user_id: String,
    /// Child profile the task belongs to
    pub child_id: String,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    /// Display position among the child's tasks
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Task {
    /// Display ordering: `order` first, then creation recency as a fallback
    pub fn display_cmp(&self, other: &Task) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.created_at.cmp(&other.created_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl Entity for Task {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Insert payload for a new task (owner and child are stamped by the scope)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTask {
    pub description: String,
    pub is_completed: bool,
    pub order: i32,
}

impl NewTask {
    pub fn new(description: impl Into<String>, order: i32) -> Self {
        Self {
            description: description.into(),
            is_completed: false,
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, order: i32, created_at: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            user_id: "u1".to_string(),
            child_id: "c1".to_string(),
            description: format!("Task {}", id),
            is_completed: false,
            order,
            created_at: created_at.map(str::to_string),
        }
    }

    #[test]
    fn test_display_cmp_uses_order_first() {
        let a = task("b", 0, Some("2024-01-02T00:00:00Z"));
        let b = task("a", 1, Some("2024-01-01T00:00:00Z"));
        assert_eq!(a.display_cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_display_cmp_breaks_ties_by_creation() {
        let older = task("z", 3, Some("2024-01-01T00:00:00Z"));
        let newer = task("a", 3, Some("2024-01-02T00:00:00Z"));
        assert_eq!(older.display_cmp(&newer), Ordering::Less);
    }

    #[test]
    fn test_task_deserializes_backend_row() {
        let row = serde_json::json!({
            "id": "t1",
            "user_id": "u1",
            "child_id": "c1",
            "description": "Escovar os dentes",
            "is_completed": true,
            "order": 2,
            "routine_id": null
        });
        let task: Task = serde_json::from_value(row).unwrap();
        assert_eq!(task.order, 2);
        assert!(task.is_completed);
        assert_eq!(task.created_at, None);
    }
}
