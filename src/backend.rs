//! Backend Setup
//!
//! Builds the services from compile-time configuration and persists the
//! session in localStorage between visits.

use serde::{Deserialize, Serialize};

use companion_core::{AppConfig, AppServices, ServiceError};

use crate::models::{Session, User};

const SESSION_KEY: &str = "auth-storage";

/// Persisted shape: `{"state":{"user":..,"session":..},"version":0}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedAuth {
    state: PersistedAuthState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedAuthState {
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    session: Option<Session>,
}

/// Hosted backend when both values were set at build time, demo otherwise
pub fn resolve_config() -> AppConfig {
    match AppConfig::resolve(option_env!("COMPANION_BACKEND_URL"), option_env!("COMPANION_ANON_KEY")) {
        Ok(config) => config,
        Err(e) => {
            log::error!("[APP] Invalid backend configuration ({}), falling back to demo mode", e);
            AppConfig::demo()
        }
    }
}

pub fn create_services() -> Result<AppServices, ServiceError> {
    AppServices::from_config(resolve_config())
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn encode_session(session: Option<&Session>) -> Result<String, serde_json::Error> {
    let persisted = PersistedAuth {
        state: PersistedAuthState { user: session.map(|s| s.user.clone()), session: session.cloned() },
        version: 0,
    };
    serde_json::to_string(&persisted)
}

fn decode_session(raw: &str) -> Option<Session> {
    match serde_json::from_str::<PersistedAuth>(raw) {
        Ok(persisted) => persisted.state.session,
        Err(e) => {
            log::warn!("[AUTH] Ignoring unreadable stored session: {}", e);
            None
        }
    }
}

/// Session saved by a previous visit
pub fn load_session() -> Option<Session> {
    let raw = storage()?.get_item(SESSION_KEY).ok().flatten()?;
    decode_session(&raw)
}

pub fn save_session(session: Option<&Session>) {
    let Some(storage) = storage() else { return };
    match encode_session(session) {
        Ok(raw) => {
            let _ = storage.set_item(SESSION_KEY, &raw);
        }
        Err(e) => log::error!("[AUTH] Could not persist session: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use companion_core::domain::UserMetadata;

    fn session() -> Session {
        Session {
            access_token: "tok".to_string(),
            refresh_token: Some("ref".to_string()),
            expires_in: Some(3600),
            user: User {
                id: "u1".to_string(),
                email: Some("ana@example.com".to_string()),
                user_metadata: UserMetadata { nome_completo: Some("Ana".to_string()) },
            },
        }
    }

    #[test]
    fn test_persisted_shape() {
        let raw = encode_session(Some(&session())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], 0);
        assert_eq!(value["state"]["user"]["id"], "u1");
        assert_eq!(value["state"]["session"]["access_token"], "tok");
        assert_eq!(decode_session(&raw), Some(session()));
    }

    #[test]
    fn test_signed_out_and_garbage_decode_to_none() {
        let raw = encode_session(None).unwrap();
        assert_eq!(decode_session(&raw), None);
        assert_eq!(decode_session("{not json"), None);
    }

    #[test]
    fn test_missing_build_values_mean_demo() {
        if option_env!("COMPANION_BACKEND_URL").is_none() && option_env!("COMPANION_ANON_KEY").is_none() {
            assert!(resolve_config().demo_mode);
        }
    }
}
