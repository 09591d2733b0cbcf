//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the one mounted `SessionManager` and the init-signal bus it listens
//! on, so `POST /api/session/init-error` reaches the same listener the
//! identity bootstrap would.

use crate::auth::InitSignals;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionManager,
    pub signals: InitSignals,
}

impl AppState {
    #[must_use]
    pub fn new(session: SessionManager, signals: InitSignals) -> Self {
        Self { session, signals }
    }
}
