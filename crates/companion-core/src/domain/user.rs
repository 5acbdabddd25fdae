//! Identity Types
//!
//! Shapes returned by the sign-in provider.

use serde::{Deserialize, Serialize};

/// Free-form metadata captured at sign-up
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome_completo: Option<String>,
}

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl User {
    /// Name used in greetings: full name, then email, then a generic label
    pub fn display_name(&self) -> String {
        self.user_metadata
            .nome_completo
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Usuário".to_string())
    }
}

/// Active session issued by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: User,
}

/// Result of a sign-up: either signed in right away, or waiting for
/// email confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    ConfirmationRequired(User),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = User {
            id: "u1".to_string(),
            email: Some("ana@example.com".to_string()),
            user_metadata: UserMetadata { nome_completo: Some("Ana".to_string()) },
        };
        assert_eq!(user.display_name(), "Ana");
        user.user_metadata.nome_completo = Some("  ".to_string());
        assert_eq!(user.display_name(), "ana@example.com");
        user.email = None;
        assert_eq!(user.display_name(), "Usuário");
    }
}
