//! Auth configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session manager never reads the environment itself; `main` builds an
//! `AuthConfig` once and injects it. Tests construct configs directly.

use std::time::Duration;

use crate::error::ErrorCode;

pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_PUBLIC_ROUTES: &[&str] = &["/", "/login", "/signup", "/forgot-password", "/reset-password"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown AUTH_PROVIDER: {0}")]
    UnknownProvider(String),
    #[error("missing config: env var {var} not set")]
    Missing { var: String },
    #[error("invalid value for {var}: {value}")]
    Invalid { var: String, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownProvider(_) => "E_UNKNOWN_PROVIDER",
            Self::Missing { .. } => "E_CONFIG_MISSING",
            Self::Invalid { .. } => "E_CONFIG_INVALID",
        }
    }
}

/// Which identity backend the session manager talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Mock,
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// When set, `bypass_auth` is allowed and setup installs the mock identity.
    pub test_mode: bool,
    pub provider: ProviderKind,
    /// Base URL of the identity service. Required for `ProviderKind::Remote`.
    pub identity_base_url: Option<String>,
    pub auth_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub public_routes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            test_mode: true,
            provider: ProviderKind::Mock,
            identity_base_url: None,
            auth_timeout: Duration::from_millis(DEFAULT_AUTH_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            public_routes: DEFAULT_PUBLIC_ROUTES.iter().map(|r| (*r).to_owned()).collect(),
        }
    }
}

impl AuthConfig {
    /// Build typed auth config from environment variables.
    ///
    /// - `AUTH_TEST_MODE`: `true` (default) enables bypass mode
    /// - `AUTH_PROVIDER`: `mock` (default) or `remote`
    /// - `IDENTITY_BASE_URL`: required when `AUTH_PROVIDER=remote`
    /// - `AUTH_TIMEOUT_MS`: default 10000
    /// - `AUTH_MAX_RETRIES`: default 3
    /// - `AUTH_RETRY_DELAY_MS`: default 1000
    /// - `AUTH_PUBLIC_ROUTES`: comma-separated paths
    ///
    /// # Errors
    ///
    /// Returns an error for unknown providers, unparsable values, or a remote
    /// provider without a base URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let test_mode = match std::env::var("AUTH_TEST_MODE") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::Invalid { var: "AUTH_TEST_MODE".into(), value: raw })?,
            Err(_) => true,
        };
        let provider = parse_provider(std::env::var("AUTH_PROVIDER").ok().as_deref())?;
        let identity_base_url = std::env::var("IDENTITY_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty());
        if provider == ProviderKind::Remote && identity_base_url.is_none() {
            return Err(ConfigError::Missing { var: "IDENTITY_BASE_URL".into() });
        }

        let public_routes = std::env::var("AUTH_PUBLIC_ROUTES").map_or_else(
            |_| DEFAULT_PUBLIC_ROUTES.iter().map(|r| (*r).to_owned()).collect(),
            |raw| parse_routes(&raw),
        );

        Ok(Self {
            test_mode,
            provider,
            identity_base_url,
            auth_timeout: Duration::from_millis(env_parse("AUTH_TIMEOUT_MS", DEFAULT_AUTH_TIMEOUT_MS)?),
            max_retries: env_parse("AUTH_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_delay: Duration::from_millis(env_parse("AUTH_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)?),
            public_routes,
        })
    }

    /// Whether `path` is reachable without a session. Trailing slashes and
    /// query strings are ignored.
    #[must_use]
    pub fn is_public_route(&self, path: &str) -> bool {
        let path = normalize_path(path);
        self.public_routes.iter().any(|route| normalize_path(route) == path)
    }
}

pub(crate) fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_provider(raw: Option<&str>) -> Result<ProviderKind, ConfigError> {
    match raw.map(str::trim).unwrap_or("mock") {
        "mock" => Ok(ProviderKind::Mock),
        "remote" => Ok(ProviderKind::Remote),
        other => Err(ConfigError::UnknownProvider(other.to_owned())),
    }
}

fn parse_routes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var: key.to_owned(), value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
