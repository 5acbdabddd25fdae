//! Identity Provider
//!
//! Email/password sign-in delegated to the hosted auth service (or an
//! in-process stand-in for the demo mode).

mod memory;
mod rest;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{Session, SignUpOutcome};

pub use memory::MemoryAuth;
pub use rest::{classify_error, RestAuth};

pub type AuthResult<T> = Result<T, AuthError>;

pub type SharedAuth = Arc<dyn AuthProvider>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("E-mail ou senha inválidos")]
    InvalidCredentials,
    #[error("E-mail ainda não confirmado")]
    EmailNotConfirmed,
    #[error("Este e-mail já está cadastrado")]
    UserExists,
    #[error("Senha fraca: {0}")]
    WeakPassword(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("auth service returned {status}: {message}")]
    Provider { status: u16, message: String },
    #[error("could not decode auth response: {0}")]
    Decode(String),
}

/// Sign-in provider contract
#[async_trait(?Send)]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// Register a new account; `full_name` goes into the user metadata
    async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> AuthResult<SignUpOutcome>;

    /// Revoke the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> AuthResult<()>;
}
