//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The dashboard front end reads and drives the auth session over this JSON
//! API. Everything lives under `/api/session` except the health probe.

pub mod session;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/session", get(session::get_session))
        .route("/api/session/bypass", post(session::bypass))
        .route("/api/session/profile", patch(session::update_profile))
        .route("/api/session/profile/refresh", post(session::refresh_profile))
        .route("/api/session/sign-in", post(session::sign_in))
        .route("/api/session/sign-up", post(session::sign_up))
        .route("/api/session/sign-out", post(session::sign_out))
        .route("/api/session/password-reset", post(session::password_reset))
        .route("/api/session/init-error", post(session::init_error))
        .route("/api/session/access", get(session::access))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
