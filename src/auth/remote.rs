//! HTTP identity service client.
//!
//! Thin JSON wrapper over the identity service's `/auth/*` endpoints. The
//! bearer token returned by sign-in/sign-up is held in memory only; a process
//! restart starts signed out. Pure parsing lives in `parse_auth_response` for
//! testability.

use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::provider::{AuthProvider, ProviderError};
use crate::config::ProviderKind;
use crate::models::{Credentials, User};

const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// CLIENT
// =============================================================================

pub struct RemoteProvider {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl RemoteProvider {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url, token: RwLock::new(None) })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> Result<(u16, String), ProviderError> {
        let mut request = self.http.post(self.endpoint(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        read_response(response).await
    }

    async fn authenticate(&self, path: &str, body: &AuthRequest<'_>) -> Result<User, ProviderError> {
        let (status, text) = self.post_json(path, body, None).await?;
        let auth = auth_outcome(status, text, body.email)?;
        *self.token.write().await = Some(auth.token);
        Ok(auth.user)
    }
}

async fn read_response(response: reqwest::Response) -> Result<(u16, String), ProviderError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::Request(e.to_string()))?;
    Ok((status, text))
}

#[async_trait::async_trait]
impl AuthProvider for RemoteProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Remote
    }

    async fn current_user(&self) -> Result<Option<User>, ProviderError> {
        let Some(token) = self.token.read().await.clone() else {
            return Ok(None);
        };

        let response = self
            .http
            .get(self.endpoint("auth/me"))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        let (status, text) = read_response(response).await?;

        let user = me_outcome(status, text)?;
        if user.is_none() {
            debug!("identity token rejected; treating as signed out");
            *self.token.write().await = None;
        }
        Ok(user)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User, ProviderError> {
        let body = AuthRequest { email: &credentials.email, password: &credentials.password, display_name: None };
        self.authenticate("auth/sign-in", &body).await
    }

    async fn sign_up(&self, credentials: &Credentials, display_name: Option<&str>) -> Result<User, ProviderError> {
        let body = AuthRequest { email: &credentials.email, password: &credentials.password, display_name };
        self.authenticate("auth/sign-up", &body).await
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let Some(token) = self.token.write().await.take() else {
            return Ok(());
        };
        let (status, text) = self
            .post_json("auth/sign-out", &serde_json::json!({}), Some(&token))
            .await?;
        // Local token is already dropped; a server-side failure only leaves a stale token there.
        if !(200..300).contains(&status) {
            warn!(status, body = %text, "identity sign-out returned non-success");
        }
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let (status, text) = self
            .post_json("auth/password-reset", &serde_json::json!({ "email": email }), None)
            .await?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(ProviderError::Response { status, body: text })
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

#[derive(Debug, serde::Deserialize)]
struct AuthResponse {
    token: String,
    user: User,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_auth_response(json: &str) -> Result<AuthResponse, ProviderError> {
    serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))
}

fn parse_user(json: &str) -> Result<User, ProviderError> {
    serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))
}

/// Map a sign-in/sign-up reply onto a token and user.
fn auth_outcome(status: u16, text: String, email: &str) -> Result<AuthResponse, ProviderError> {
    match status {
        200 | 201 => parse_auth_response(&text),
        401 | 403 => Err(ProviderError::InvalidCredentials),
        409 => Err(ProviderError::AccountExists(email.to_owned())),
        _ => Err(ProviderError::Response { status, body: text }),
    }
}

/// Map a `GET /auth/me` reply. `Ok(None)` means the token was rejected.
fn me_outcome(status: u16, text: String) -> Result<Option<User>, ProviderError> {
    match status {
        200 => parse_user(&text).map(Some),
        401 => Ok(None),
        _ => Err(ProviderError::Response { status, body: text }),
    }
}

#[cfg(test)]
#[path = "remote_test.rs"]
mod tests;
