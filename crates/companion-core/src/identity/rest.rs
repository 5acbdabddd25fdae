//! REST Identity Provider
//!
//! GoTrue endpoints under `{base}/auth/v1`.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};

use super::{AuthError, AuthProvider, AuthResult};
use crate::config::AppConfig;
use crate::domain::{Session, SignUpOutcome, User};

pub struct RestAuth {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl RestAuth {
    pub fn new(config: &AppConfig) -> AuthResult<Self> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.request_timeout);
        let client = builder.build().map_err(|e| AuthError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn post(&self, path: &str, bearer: Option<&str>) -> RequestBuilder {
        let bearer = bearer.unwrap_or(&self.anon_key);
        self.client
            .post(format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn send(&self, builder: RequestBuilder) -> AuthResult<Response> {
        let response = builder.send().await.map_err(|e| AuthError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }

    async fn send_json(&self, builder: RequestBuilder) -> AuthResult<Value> {
        self.send(builder)
            .await?
            .json::<Value>()
            .await
            .map_err(|e| AuthError::Decode(e.to_string()))
    }
}

/// Map an error response from the auth service to an [`AuthError`]
pub fn classify_error(status: u16, body: &str) -> AuthError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let message = ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| parsed.get(*key).and_then(Value::as_str))
        .unwrap_or(body)
        .to_string();
    let code = parsed.get("error_code").and_then(Value::as_str).unwrap_or_default();
    let lower = message.to_lowercase();

    if code == "invalid_credentials" || lower.contains("invalid login credentials") {
        AuthError::InvalidCredentials
    } else if code == "email_not_confirmed" || lower.contains("email not confirmed") {
        AuthError::EmailNotConfirmed
    } else if code == "user_already_exists" || lower.contains("already registered") {
        AuthError::UserExists
    } else if code == "weak_password" || lower.contains("password should be") {
        AuthError::WeakPassword(message)
    } else {
        AuthError::Provider { status, message }
    }
}

/// Sign-up answers with a session when confirmation is off, otherwise with
/// the bare user (older servers) or `{ user, session: null }`
fn parse_sign_up(body: Value) -> AuthResult<SignUpOutcome> {
    if body.get("access_token").is_some() {
        let session: Session = serde_json::from_value(body).map_err(|e| AuthError::Decode(e.to_string()))?;
        return Ok(SignUpOutcome::SignedIn(session));
    }
    let user_value = match body.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => body,
    };
    let user: User = serde_json::from_value(user_value).map_err(|e| AuthError::Decode(e.to_string()))?;
    Ok(SignUpOutcome::ConfirmationRequired(user))
}

#[async_trait(?Send)]
impl AuthProvider for RestAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let body = json!({ "email": email, "password": password });
        let value = self.send_json(self.post("token?grant_type=password", None).json(&body)).await?;
        serde_json::from_value(value).map_err(|e| AuthError::Decode(e.to_string()))
    }

    async fn sign_up(&self, email: &str, password: &str, full_name: Option<&str>) -> AuthResult<SignUpOutcome> {
        let mut body = json!({ "email": email, "password": password });
        if let Some(name) = full_name {
            body["data"] = json!({ "nome_completo": name });
        }
        let value = self.send_json(self.post("signup", None).json(&body)).await?;
        parse_sign_up(value)
    }

    async fn sign_out(&self, access_token: &str) -> AuthResult<()> {
        self.send(self.post("logout", Some(access_token))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_error_known_messages() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(classify_error(400, body), AuthError::InvalidCredentials);

        let body = r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#;
        assert_eq!(classify_error(400, body), AuthError::EmailNotConfirmed);

        let body = r#"{"code":422,"msg":"User already registered"}"#;
        assert_eq!(classify_error(422, body), AuthError::UserExists);
    }

    #[test]
    fn test_classify_error_falls_back_to_provider() {
        assert_eq!(
            classify_error(500, "upstream down"),
            AuthError::Provider { status: 500, message: "upstream down".to_string() }
        );
    }

    #[test]
    fn test_parse_sign_up_variants() {
        let signed_in = json!({
            "access_token": "t", "refresh_token": "r", "expires_in": 3600,
            "user": { "id": "u1", "email": "a@b.c" }
        });
        assert!(matches!(parse_sign_up(signed_in).unwrap(), SignUpOutcome::SignedIn(s) if s.user.id == "u1"));

        let bare_user = json!({ "id": "u2", "email": "d@e.f" });
        assert!(matches!(parse_sign_up(bare_user).unwrap(), SignUpOutcome::ConfirmationRequired(u) if u.id == "u2"));

        let wrapped = json!({ "user": { "id": "u3" }, "session": null });
        assert!(matches!(parse_sign_up(wrapped).unwrap(), SignUpOutcome::ConfirmationRequired(u) if u.id == "u3"));
    }
}
