//! Session routes.
//!
//! Handlers are thin: each forwards to `SessionManager` and maps
//! `SessionError` onto a status code plus a `{code, message, retryable}` body.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{InitErrorSignal, ProviderError};
use crate::error::ErrorCode;
use crate::models::{Credentials, ProfileUpdate, Session, UserProfile};
use crate::session::{AuthState, RouteAccess, SessionError, route_access};
use crate::state::AppState;
use crate::store::StoreError;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

/// `SessionError` rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub SessionError);

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.0.error_code(),
            message: self.0.to_string(),
            retryable: self.0.retryable(),
        };
        (error_status(&self.0), Json(body)).into_response()
    }
}

pub(crate) fn error_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::InitTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SessionError::InitSignaled(_) => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::Unauthenticated => StatusCode::UNAUTHORIZED,
        SessionError::BypassDisallowed => StatusCode::FORBIDDEN,
        SessionError::Provider(e) => match e {
            ProviderError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ProviderError::AccountExists(_) => StatusCode::CONFLICT,
            ProviderError::Request(_) | ProviderError::Response { .. } | ProviderError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProviderError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
        SessionError::Store(e) => match e {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::Db(_) if e.retryable() => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct AccessQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct InitErrorAck {
    pub delivered: usize,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/session` — current state snapshot.
pub async fn get_session(State(state): State<AppState>) -> Json<AuthState> {
    Json(state.session.snapshot())
}

/// `POST /api/session/bypass` — install the mock identity (test mode only).
pub async fn bypass(State(state): State<AppState>) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.session.bypass_auth()?))
}

/// `PATCH /api/session/profile` — merge a partial profile edit.
pub async fn update_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.session.update_user_profile(update).await?))
}

/// `POST /api/session/profile/refresh` — reload the profile from the store.
pub async fn refresh_profile(State(state): State<AppState>) -> Result<Json<Option<UserProfile>>, ApiError> {
    Ok(Json(state.session.refresh_profile().await?))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Session>, ApiError> {
    Ok(Json(state.session.sign_in(&credentials).await?))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let credentials = Credentials { email: body.email, password: body.password };
    let session = state
        .session
        .sign_up(&credentials, body.display_name.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_out(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.session.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn password_reset(
    State(state): State<AppState>,
    Json(body): Json<PasswordResetRequest>,
) -> Result<StatusCode, ApiError> {
    state.session.send_password_reset(&body.email).await?;
    Ok(StatusCode::ACCEPTED)
}

/// `POST /api/session/init-error` — emit a `firebase-init-error` signal.
pub async fn init_error(State(state): State<AppState>, Json(signal): Json<InitErrorSignal>) -> Json<InitErrorAck> {
    let delivered = state.signals.emit(signal.detail.error);
    info!(delivered, "init error signal emitted over http");
    Json(InitErrorAck { delivered })
}

/// `GET /api/session/access?path=` — guard decision for a page.
pub async fn access(State(state): State<AppState>, Query(query): Query<AccessQuery>) -> Json<RouteAccess> {
    let snapshot = state.session.snapshot();
    Json(route_access(&snapshot, &query.path, state.session.config()))
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
