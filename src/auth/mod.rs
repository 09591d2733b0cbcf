//! Identity backends and the init-error signal bus.
//!
//! ARCHITECTURE
//! ============
//! The session manager talks to identity through the `AuthProvider` trait.
//! `MockProvider` serves the fixed development identity; `RemoteProvider`
//! talks to an HTTP identity service. Which one runs is decided by
//! `AuthConfig::provider`, never by ambient flags.

pub mod mock;
pub mod provider;
pub mod remote;
pub mod signals;

use std::sync::Arc;

pub use mock::{MOCK_UID, MockIdentity, MockProvider};
pub use provider::{AuthProvider, ProviderError};
pub use remote::RemoteProvider;
pub use signals::{INIT_ERROR_EVENT, InitErrorEvent, InitErrorSignal, InitSignals};

use crate::config::{AuthConfig, ConfigError, ProviderKind};

/// Build the provider named by `config`.
///
/// # Errors
///
/// Returns an error if the remote provider has no base URL or its HTTP
/// client cannot be built.
pub fn provider_from_config(
    config: &AuthConfig,
    identity: Arc<MockIdentity>,
) -> Result<Arc<dyn AuthProvider>, ConfigError> {
    match config.provider {
        ProviderKind::Mock => Ok(Arc::new(MockProvider::new(identity))),
        ProviderKind::Remote => {
            let base_url = config
                .identity_base_url
                .clone()
                .ok_or_else(|| ConfigError::Missing { var: "IDENTITY_BASE_URL".into() })?;
            let provider = RemoteProvider::new(base_url, config.auth_timeout)
                .map_err(|e| ConfigError::Invalid { var: "IDENTITY_BASE_URL".into(), value: e.to_string() })?;
            Ok(Arc::new(provider))
        }
    }
}
