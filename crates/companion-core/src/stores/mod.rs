//! Entity Stores
//!
//! Session-scoped state for identity, child profiles and the per-child
//! record lists. Each store is an explicit object owned by the application
//! services and pushes snapshots to its listeners after every change.

mod auth;
mod profile;
mod records;

#[cfg(test)]
mod tests;

use thiserror::Error;

use crate::gateway::GatewayError;

pub use auth::{AuthState, AuthStore};
pub use profile::{ProfileState, ProfileStore};
pub use records::{RecordList, RecordListState};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Usuário não autenticado")]
    NotAuthenticated,
    #[error("Nenhuma criança selecionada")]
    NoActiveChild,
    #[error("{0}")]
    Validation(String),
    #[error("record {0} not found")]
    NotFound(String),
    /// The owner or child changed while the request was in flight
    #[error("session changed before the request completed")]
    SessionChanged,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
