//! UI Components
//!
//! Reusable Leptos components.

mod child_selector;
mod delete_confirm_button;
mod header;
mod profile_form;
mod sidebar;
mod task_board;

pub use child_selector::ChildSelector;
pub use delete_confirm_button::DeleteConfirmButton;
pub use header::Header;
pub use profile_form::ProfileForm;
pub use sidebar::Sidebar;
pub use task_board::TaskBoard;
