//! Auth session: state record, lifecycle manager, and route guard.

pub mod error;
pub mod guard;
pub mod manager;
pub mod state;

pub use error::{ErrorKind, ErrorRecord, SessionError};
pub use guard::{LOGIN_PATH, ONBOARDING_PATH, RouteAccess, route_access, should_redirect_unauth};
pub use manager::{SessionDeps, SessionManager};
pub use state::{AuthState, SessionPhase};
