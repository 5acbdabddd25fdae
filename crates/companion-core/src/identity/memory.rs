//! In-Memory Identity Provider

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use super::{AuthError, AuthProvider, AuthResult};
use crate::domain::{Session, SignUpOutcome, User, UserMetadata};

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    user: User,
    confirmed: bool,
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    next_id: u64,
    failures: VecDeque<AuthError>,
}

/// Accounts kept in process; used by the demo mode and tests
#[derive(Default)]
pub struct MemoryAuth {
    state: Mutex<AuthState>,
    require_confirmation: bool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// New accounts must be confirmed before they can sign in
    pub fn with_email_confirmation() -> Self {
        Self { require_confirmation: true, ..Self::default() }
    }

    /// Mark an account as confirmed
    pub fn confirm(&self, email: &str) -> bool {
        match self.state.lock().accounts.get_mut(&email.to_lowercase()) {
            Some(account) => {
                account.confirmed = true;
                true
            }
            None => false,
        }
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: AuthError) {
        self.state.lock().failures.push_back(error);
    }

    fn session_for(user: &User) -> Session {
        Session {
            access_token: format!("demo-token-{}", user.id),
            refresh_token: None,
            expires_in: None,
            user: user.clone(),
        }
    }
}

#[async_trait(?Send)]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let mut state = self.state.lock();
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let account = state
            .accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        if !account.confirmed {
            return Err(AuthError::EmailNotConfirmed);
        }
        Ok(Self::session_for(&account.user))
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> AuthResult<SignUpOutcome> {
        let mut state = self.state.lock();
        if let Some(error) = state.failures.pop_front() {
            return Err(error);
        }
        let key = email.trim().to_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(AuthError::UserExists);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(format!(
                "a senha deve ter pelo menos {} caracteres",
                MIN_PASSWORD_LEN
            )));
        }

        state.next_id += 1;
        let user = User {
            id: format!("demo-user-{}", state.next_id),
            email: Some(key.clone()),
            user_metadata: UserMetadata { nome_completo: full_name.map(str::to_string) },
        };
        let confirmed = !self.require_confirmation;
        state.accounts.insert(
            key,
            Account { password: password.to_string(), user: user.clone(), confirmed },
        );

        Ok(if confirmed {
            SignUpOutcome::SignedIn(Self::session_for(&user))
        } else {
            SignUpOutcome::ConfirmationRequired(user)
        })
    }

    async fn sign_out(&self, _access_token: &str) -> AuthResult<()> {
        match self.state.lock().failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = MemoryAuth::new();
        let outcome = auth.sign_up("Ana@Example.com", "segredo1", Some("Ana")).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::SignedIn(_)));

        let session = auth.sign_in("ana@example.com", "segredo1").await.unwrap();
        assert_eq!(session.user.user_metadata.nome_completo.as_deref(), Some("Ana"));
        assert_eq!(auth.sign_in("ana@example.com", "errada").await, Err(AuthError::InvalidCredentials));
        assert_eq!(auth.sign_up("ana@example.com", "segredo1", None).await, Err(AuthError::UserExists));
    }

    #[tokio::test]
    async fn test_confirmation_required() {
        let auth = MemoryAuth::with_email_confirmation();
        let outcome = auth.sign_up("bia@example.com", "segredo1", None).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired(_)));
        assert_eq!(auth.sign_in("bia@example.com", "segredo1").await, Err(AuthError::EmailNotConfirmed));

        assert!(auth.confirm("bia@example.com"));
        assert!(auth.sign_in("bia@example.com", "segredo1").await.is_ok());
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let auth = MemoryAuth::new();
        assert!(matches!(auth.sign_up("c@d.e", "123", None).await, Err(AuthError::WeakPassword(_))));
    }
}
