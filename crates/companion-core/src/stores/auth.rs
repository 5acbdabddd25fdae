//! Authentication Store

use parking_lot::Mutex;

use crate::domain::{Session, SignUpOutcome, User};
use crate::identity::{AuthError, SharedAuth};
use crate::notify::Listeners;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Sign-up succeeded but the account waits for email confirmation
    pub awaiting_confirmation: bool,
}

/// Identity and session of the current user
pub struct AuthStore {
    provider: SharedAuth,
    state: Mutex<AuthState>,
    listeners: Listeners<AuthState>,
}

impl AuthStore {
    pub fn new(provider: SharedAuth) -> Self {
        Self { provider, state: Mutex::new(AuthState::default()), listeners: Listeners::default() }
    }

    pub fn state(&self) -> AuthState {
        self.state.lock().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.lock().session.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state.lock().user.clone()
    }

    pub fn subscribe(&self, listener: impl Fn(&AuthState) + Send + Sync + 'static) {
        self.listeners.add(listener);
    }

    fn update(&self, f: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.state.lock();
            f(&mut state);
            state.clone()
        };
        self.listeners.emit(&snapshot);
    }

    fn start(&self) {
        self.update(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn fail(&self, error: &AuthError, clear_identity: bool) {
        log::error!("[AUTH] {}", error);
        let message = error.to_string();
        self.update(|s| {
            s.is_loading = false;
            s.error = Some(message);
            if clear_identity {
                s.user = None;
                s.session = None;
            }
        });
    }

    fn establish(&self, session: Session) {
        self.update(|s| {
            s.user = Some(session.user.clone());
            s.session = Some(session);
            s.is_loading = false;
            s.awaiting_confirmation = false;
        });
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.start();
        match self.provider.sign_in(email.trim(), password).await {
            Ok(session) => {
                log::info!("[AUTH] Signed in as {}", session.user.id);
                self.establish(session.clone());
                Ok(session)
            }
            Err(e) => {
                self.fail(&e, true);
                Err(e)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> Result<SignUpOutcome, AuthError> {
        self.start();
        match self.provider.sign_up(email.trim(), password, full_name).await {
            Ok(SignUpOutcome::SignedIn(session)) => {
                self.establish(session.clone());
                Ok(SignUpOutcome::SignedIn(session))
            }
            Ok(SignUpOutcome::ConfirmationRequired(user)) => {
                log::info!("[AUTH] Account {} awaits email confirmation", user.id);
                self.update(|s| {
                    s.user = None;
                    s.session = None;
                    s.is_loading = false;
                    s.awaiting_confirmation = true;
                });
                Ok(SignUpOutcome::ConfirmationRequired(user))
            }
            Err(e) => {
                self.fail(&e, true);
                Err(e)
            }
        }
    }

    /// Revoke the session. On failure the identity is kept.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self.state.lock().session.as_ref().map(|s| s.access_token.clone());
        let Some(token) = token else {
            self.restore(None);
            return Ok(());
        };
        self.start();
        match self.provider.sign_out(&token).await {
            Ok(()) => {
                log::info!("[AUTH] Signed out");
                self.restore(None);
                Ok(())
            }
            Err(e) => {
                self.fail(&e, false);
                Err(e)
            }
        }
    }

    /// Adopt a session persisted by a previous visit (or drop the identity)
    pub fn restore(&self, session: Option<Session>) {
        self.update(|s| {
            s.user = session.as_ref().map(|session| session.user.clone());
            s.session = session;
            s.is_loading = false;
            s.awaiting_confirmation = false;
        });
    }

    pub fn clear_error(&self) {
        self.update(|s| s.error = None);
    }
}
