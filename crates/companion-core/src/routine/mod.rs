//! Routine Board
//!
//! The ordered task list of the active child profile and its
//! reconciliation with the backend.

mod controller;
mod error;

#[cfg(test)]
mod tests;

pub use controller::{Phase, TaskListController, TaskListSnapshot};
pub use error::{FailureCause, TaskListError};
