//! Application Services
//!
//! Owns every store for one running app and keeps them pointed at the
//! current session and child selection.

use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::domain::{ChildProfile, ChildProfilePatch, DiaryEntry, NewChildProfile, Reminder, Session, SignUpOutcome};
use crate::gateway::{GatewayError, MemoryGateway, RestGateway, SharedGateway};
use crate::identity::{AuthError, MemoryAuth, RestAuth, SharedAuth};
use crate::routine::TaskListController;
use crate::stores::{AuthStore, ProfileStore, RecordList, StoreError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("could not create backend client: {0}")]
    Gateway(#[from] GatewayError),
    #[error("could not create auth client: {0}")]
    Auth(#[from] AuthError),
}

pub struct AppServices {
    config: AppConfig,
    gateway: SharedGateway,
    pub auth: AuthStore,
    pub profiles: ProfileStore,
    pub diary: RecordList<DiaryEntry>,
    pub reminders: RecordList<Reminder>,
    pub tasks: TaskListController,
}

impl AppServices {
    pub fn new(config: AppConfig, gateway: SharedGateway, auth: SharedAuth) -> Self {
        Self {
            config,
            auth: AuthStore::new(auth),
            profiles: ProfileStore::new(gateway.clone()),
            diary: RecordList::new(gateway.clone()),
            reminders: RecordList::new(gateway.clone()),
            tasks: TaskListController::new(gateway.clone()),
            gateway,
        }
    }

    /// Hosted backend, or the in-memory one in demo mode
    pub fn from_config(config: AppConfig) -> Result<Self, ServiceError> {
        if config.demo_mode {
            log::warn!("[APP] No backend configured, running in demo mode");
            let gateway: SharedGateway = Arc::new(MemoryGateway::new());
            let auth: SharedAuth = Arc::new(MemoryAuth::new());
            return Ok(Self::new(config, gateway, auth));
        }
        log::info!("[APP] Using backend {}", config.backend_url);
        let gateway: SharedGateway = Arc::new(RestGateway::new(&config)?);
        let auth: SharedAuth = Arc::new(RestAuth::new(&config)?);
        Ok(Self::new(config, gateway, auth))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ========================
    // Session
    // ========================

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.auth.sign_in(email, password).await?;
        self.apply_session(Some(&session));
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> Result<SignUpOutcome, AuthError> {
        let outcome = self.auth.sign_up(email, password, full_name).await?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            self.apply_session(Some(session));
        }
        Ok(outcome)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;
        self.apply_session(None);
        Ok(())
    }

    /// Resume a persisted session without contacting the provider
    pub fn restore(&self, session: Option<Session>) {
        self.auth.restore(session.clone());
        self.apply_session(session.as_ref());
    }

    fn apply_session(&self, session: Option<&Session>) {
        self.gateway.authorize(session.map(|s| s.access_token.clone()));
        let owner = session.map(|s| s.user.id.as_str());
        self.profiles.set_owner(owner);
        self.diary.set_owner(owner);
        self.reminders.set_owner(owner);
        self.tasks.set_owner(owner);
        self.sync_selection();
    }

    // ========================
    // Child selection
    // ========================

    /// Point the per-child stores at the profile store's selection
    pub fn sync_selection(&self) {
        let child = self.profiles.selected_child_id();
        let child = child.as_deref();
        self.diary.set_child(child);
        self.reminders.set_child(child);
        if self.tasks.active_child().as_deref() != child {
            self.tasks.clear();
        }
    }

    pub fn select_child(&self, child_id: Option<&str>) {
        self.profiles.select(child_id);
        self.sync_selection();
    }

    pub async fn fetch_profiles(&self) -> Result<Vec<ChildProfile>, StoreError> {
        let result = self.profiles.fetch().await;
        self.sync_selection();
        result
    }

    pub async fn add_profile(&self, profile: &NewChildProfile) -> Result<ChildProfile, StoreError> {
        let result = self.profiles.add(profile).await;
        self.sync_selection();
        result
    }

    pub async fn update_profile(&self, child_id: &str, patch: &ChildProfilePatch) -> Result<ChildProfile, StoreError> {
        self.profiles.update_profile(child_id, patch).await
    }

    pub async fn delete_profile(&self, child_id: &str) -> Result<(), StoreError> {
        let result = self.profiles.delete(child_id).await;
        self.sync_selection();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewTask;
    use crate::repository::OwnerScope;
    use crate::routine::Phase;

    fn demo() -> (Arc<MemoryGateway>, AppServices) {
        let memory = Arc::new(MemoryGateway::new());
        let services = AppServices::new(AppConfig::demo(), memory.clone(), Arc::new(MemoryAuth::new()));
        (memory, services)
    }

    fn profile(name: &str) -> NewChildProfile {
        NewChildProfile {
            nome_crianca: name.to_string(),
            data_nascimento: "2015-01-01".to_string(),
            diagnostico_tdah: false,
            grau_tdah: None,
            informacoes_adicionais: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_scopes_every_store() {
        let (_memory, services) = demo();
        services.sign_up("ana@example.com", "segredo1", Some("Ana")).await.unwrap();

        let child = services.add_profile(&profile("Lucas")).await.unwrap();
        assert_eq!(services.profiles.selected_child_id(), Some(child.child_id.clone()));
        services.diary.load().await.unwrap();

        services.tasks.load(&child.child_id).await.unwrap();
        let task = services.tasks.add_task("Escovar os dentes").await.unwrap();
        assert_eq!(task.child_id, child.child_id);
    }

    #[tokio::test]
    async fn test_sign_out_resets_state() {
        let (memory, services) = demo();
        services.sign_up("ana@example.com", "segredo1", None).await.unwrap();
        let child = services.add_profile(&profile("Lucas")).await.unwrap();
        services.tasks.load(&child.child_id).await.unwrap();

        services.sign_out().await.unwrap();
        assert!(services.auth.session().is_none());
        assert!(services.profiles.state().profiles.is_empty());
        assert_eq!(services.tasks.phase(), Phase::Uninitialized);
        assert_eq!(services.diary.load().await, Err(StoreError::NotAuthenticated));
        assert_eq!(memory.rows(crate::gateway::Table::Children).len(), 1);
    }

    #[tokio::test]
    async fn test_switching_child_clears_task_list() {
        let (memory, services) = demo();
        let Ok(SignUpOutcome::SignedIn(session)) = services.sign_up("b@example.com", "segredo1", None).await else {
            panic!("expected a session");
        };
        let a = services.add_profile(&profile("Ana")).await.unwrap();
        let b = services.add_profile(&profile("Bia")).await.unwrap();
        OwnerScope::new(memory.clone(), session.user.id.as_str())
            .child(a.child_id.as_str())
            .insert::<crate::domain::Task, _>(&NewTask::new("Arrumar a cama", 0))
            .await
            .unwrap();

        services.tasks.load(&a.child_id).await.unwrap();
        assert_eq!(services.tasks.tasks().len(), 1);

        services.select_child(Some(&b.child_id));
        assert!(services.tasks.tasks().is_empty());
        assert_eq!(services.tasks.active_child(), None);
    }
}
