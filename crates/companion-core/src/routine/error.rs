//! Task list errors

use thiserror::Error;

use super::controller::Phase;
use crate::gateway::GatewayError;

/// Why a mutation could not be persisted
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("only {applied} of {total} positions were saved")]
    PartialWrite { applied: usize, total: usize },
    #[error("the task no longer exists on the server")]
    Missing,
    #[error("discarded after the list was reloaded")]
    Superseded,
}

/// Errors reported by [`super::TaskListController`]. After any of them the
/// controller holds a consistent sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskListError {
    #[error("could not load tasks: {0}")]
    FetchError(GatewayError),
    #[error("could not create task: {0}")]
    CreateFailed(FailureCause),
    #[error("could not update task: {0}")]
    UpdateFailed(FailureCause),
    #[error("could not delete task: {0}")]
    DeleteFailed(FailureCause),
    #[error("could not save the new order: {0}")]
    ReorderFailed(FailureCause),
    #[error("{0}")]
    Validation(String),
    #[error("index {index} is out of range for {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("task {0} is not in the list")]
    TaskNotFound(String),
    #[error("task list is not ready ({0:?})")]
    NotReady(Phase),
    #[error("no child profile is selected")]
    NoActiveChild,
    #[error("not signed in")]
    NotAuthenticated,
}

impl TaskListError {
    /// True for failures of a persisted mutation (as opposed to rejected input)
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            TaskListError::FetchError(_)
                | TaskListError::CreateFailed(_)
                | TaskListError::UpdateFailed(_)
                | TaskListError::DeleteFailed(_)
                | TaskListError::ReorderFailed(_)
        )
    }
}
