//! Session manager — owns `AuthState` and runs the mount lifecycle.
//!
//! DESIGN
//! ======
//! State lives in a `watch` channel: consumers take snapshots or subscribe,
//! and every write goes through `Inner::update`, which refuses to touch state
//! once the manager is unmounted. That single choke point is what keeps late
//! timers, late signals, and late store replies from mutating a dead session.
//!
//! LIFECYCLE
//! =========
//! `mount` seeds a loading state, then spawns three tasks:
//! - a listener for `firebase-init-error` signals (error + stop loading),
//! - a one-shot timeout guard (timeout error if still loading),
//! - the setup routine (bypass in test mode, otherwise ask the provider),
//!   retried up to `max_retries` times with a fixed delay.
//!
//! `unmount` flips the mounted flag, waits out any in-progress write, and
//! aborts all three tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::{ErrorKind, ErrorRecord, SessionError};
use super::state::{AuthState, SessionPhase};
use crate::auth::{AuthProvider, INIT_ERROR_EVENT, InitErrorEvent, InitSignals, MockIdentity};
use crate::config::AuthConfig;
use crate::models::{Credentials, ProfileUpdate, Session, User, UserProfile};
use crate::store::{ProfileStore, get_or_create_profile};

/// Collaborators injected at mount.
pub struct SessionDeps {
    pub provider: Arc<dyn AuthProvider>,
    pub store: Arc<dyn ProfileStore>,
    pub identity: Arc<MockIdentity>,
    pub signals: InitSignals,
}

/// Cloneable handle to one mounted session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: AuthConfig,
    provider: Arc<dyn AuthProvider>,
    store: Arc<dyn ProfileStore>,
    identity: Arc<MockIdentity>,
    state: watch::Sender<AuthState>,
    mounted: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Inner {
    /// Apply `f` to the state if still mounted. `f` returns whether it changed
    /// anything; subscribers are only notified on change.
    fn update(&self, f: impl FnOnce(&mut AuthState) -> bool) -> bool {
        self.state
            .send_if_modified(|state| self.mounted.load(Ordering::Acquire) && f(state))
    }

    fn record(&self, kind: ErrorKind, err: &SessionError) {
        let record = ErrorRecord::new(kind, err);
        self.update(|state| {
            state.error = Some(record);
            true
        });
    }

    fn snapshot(&self) -> AuthState {
        self.state.borrow().clone()
    }

    async fn setup_once(&self) -> Result<SessionPhase, SessionError> {
        if self.config.test_mode {
            let session = self.identity.session();
            self.update(|state| {
                state.install_bypass(session);
                true
            });
            return Ok(SessionPhase::Bypassed);
        }

        match self.provider.current_user().await? {
            Some(user) => {
                let (profile, created) = get_or_create_profile(self.store.as_ref(), &user).await?;
                self.update(|state| {
                    state.authenticate(user, profile, created);
                    true
                });
                Ok(SessionPhase::Authenticated)
            }
            None => {
                self.update(|state| {
                    state.sign_out();
                    true
                });
                Ok(SessionPhase::SignedOut)
            }
        }
    }
}

impl SessionManager {
    /// Mount a session: seed loading state and start the lifecycle tasks.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn mount(config: AuthConfig, deps: SessionDeps) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        let inner = Arc::new(Inner {
            config,
            provider: deps.provider,
            store: deps.store,
            identity: deps.identity,
            state,
            mounted: AtomicBool::new(true),
            tasks: Mutex::new(Vec::new()),
        });

        // Subscribe before spawning so signals emitted right after mount are seen.
        let signal_rx = deps.signals.subscribe();
        let tasks = vec![
            tokio::spawn(listen_for_init_errors(Arc::clone(&inner), signal_rx)),
            tokio::spawn(init_timeout_guard(Arc::clone(&inner))),
            tokio::spawn(run_setup(Arc::clone(&inner))),
        ];
        *inner.tasks.lock().unwrap_or_else(PoisonError::into_inner) = tasks;

        debug!(
            test_mode = inner.config.test_mode,
            provider = ?inner.provider.kind(),
            timeout = ?inner.config.auth_timeout,
            "session manager mounted"
        );
        Self { inner }
    }

    /// Stop the lifecycle tasks. No state change is observable afterwards.
    ///
    /// The init-error listener is released asynchronously: its receiver drops
    /// once the runtime reaps the aborted task, not before this returns.
    pub fn unmount(&self) {
        if !self.inner.mounted.swap(false, Ordering::AcqRel) {
            return;
        }
        // Barrier: wait for any write that saw `mounted == true` to finish.
        self.inner.state.send_if_modified(|_| false);

        let tasks = std::mem::take(&mut *self.inner.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            task.abort();
        }
        info!("session manager unmounted");
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    /// Wait until the session stops loading and return that state.
    ///
    /// Never resolves if the manager is unmounted while still loading.
    pub async fn settled(&self) -> AuthState {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }

    // =========================================================================
    // BYPASS
    // =========================================================================

    /// Install the mock identity as the active session.
    ///
    /// # Errors
    ///
    /// Returns `BypassDisallowed` when test mode is off.
    pub fn bypass_auth(&self) -> Result<Session, SessionError> {
        if !self.inner.config.test_mode {
            let err = SessionError::BypassDisallowed;
            warn!("auth bypass requested outside test mode");
            self.inner.record(ErrorKind::Bypass, &err);
            return Err(err);
        }

        let session = self.inner.identity.session();
        self.inner.update(|state| {
            state.install_bypass(session.clone());
            true
        });
        info!(uid = %session.user.uid, "auth bypass enabled");
        Ok(session)
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Merge `update` into the active profile.
    ///
    /// In bypass mode the merge stays in memory; otherwise it goes through
    /// the profile store and the stored result is adopted.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` without a user, or the store failure. Both are also
    /// recorded in the state's `error`.
    pub async fn update_user_profile(&self, update: ProfileUpdate) -> Result<UserProfile, SessionError> {
        let snapshot = self.snapshot();

        if snapshot.bypass_auth_enabled {
            // Merge in place under the state lock.
            let mut merged = None;
            self.inner.update(|state| {
                if !state.bypass_auth_enabled {
                    return false;
                }
                let Some(profile) = state.user_profile.as_mut() else {
                    return false;
                };
                update.apply(profile);
                profile.touch();
                merged = Some(profile.clone());
                true
            });
            if let Some(profile) = merged {
                debug!(uid = %profile.uid, "bypass profile updated in memory");
                return Ok(profile);
            }

            // Unmounted or left bypass meanwhile; the merge is not kept.
            let Some(mut profile) = snapshot.user_profile else {
                return self.fail(ErrorKind::ProfileUpdate, SessionError::Unauthenticated);
            };
            update.apply(&mut profile);
            profile.touch();
            return Ok(profile);
        }

        let Some(user) = snapshot.user else {
            return self.fail(ErrorKind::ProfileUpdate, SessionError::Unauthenticated);
        };

        match self.inner.store.update_profile(&user.uid, &update).await {
            Ok(profile) => {
                let adopted = self.inner.update(|state| state.adopt_profile(profile.clone()));
                if !adopted {
                    debug!(uid = %user.uid, "stored profile not adopted; session changed or holds a newer copy");
                }
                info!(uid = %user.uid, "profile updated");
                Ok(profile)
            }
            Err(e) => {
                error!(uid = %user.uid, error = %e, "profile update failed");
                self.fail(ErrorKind::ProfileUpdate, e.into())
            }
        }
    }

    /// Reload the active profile from the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn refresh_profile(&self) -> Result<Option<UserProfile>, SessionError> {
        let snapshot = self.snapshot();
        if snapshot.bypass_auth_enabled {
            return Ok(snapshot.user_profile);
        }
        let Some(user) = snapshot.user else {
            return Ok(None);
        };

        let profile = self.inner.store.get_profile(&user.uid).await?;
        if let Some(profile) = &profile {
            self.inner.update(|state| state.adopt_profile(profile.clone()));
        }
        Ok(profile)
    }

    // =========================================================================
    // SIGN-IN / SIGN-OUT
    // =========================================================================

    /// # Errors
    ///
    /// Provider rejection or store failure; recorded as a sign-in error.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        let result = self.try_sign_in(credentials).await;
        self.note(ErrorKind::SignIn, result)
    }

    /// # Errors
    ///
    /// Provider rejection or store failure; recorded as a sign-in error.
    pub async fn sign_up(&self, credentials: &Credentials, display_name: Option<&str>) -> Result<Session, SessionError> {
        let result = self.try_sign_up(credentials, display_name).await;
        self.note(ErrorKind::SignIn, result)
    }

    /// # Errors
    ///
    /// Provider failure; the local session is left as it was.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let result = self.try_sign_out().await;
        self.note(ErrorKind::SignOut, result)
    }

    /// # Errors
    ///
    /// Provider failure.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), SessionError> {
        self.inner.provider.send_password_reset(email).await?;
        Ok(())
    }

    async fn try_sign_in(&self, credentials: &Credentials) -> Result<Session, SessionError> {
        let user = self.inner.provider.sign_in(credentials).await?;
        self.install_user(user).await
    }

    async fn try_sign_up(&self, credentials: &Credentials, display_name: Option<&str>) -> Result<Session, SessionError> {
        let user = self.inner.provider.sign_up(credentials, display_name).await?;
        self.install_user(user).await
    }

    async fn try_sign_out(&self) -> Result<(), SessionError> {
        self.inner.provider.sign_out().await?;
        let uid = self.snapshot().user.map(|u| u.uid);
        self.inner.update(|state| {
            state.sign_out();
            true
        });
        info!(uid = ?uid, "user signed out");
        Ok(())
    }

    async fn install_user(&self, user: User) -> Result<Session, SessionError> {
        let (profile, created) = get_or_create_profile(self.inner.store.as_ref(), &user).await?;
        let session = Session { user, profile };
        let installed = session.clone();
        self.inner.update(|state| {
            state.authenticate(installed.user, installed.profile, created);
            true
        });
        info!(uid = %session.user.uid, is_new_user = created, "user signed in");
        Ok(session)
    }

    fn fail<T>(&self, kind: ErrorKind, err: SessionError) -> Result<T, SessionError> {
        self.inner.record(kind, &err);
        Err(err)
    }

    fn note<T>(&self, kind: ErrorKind, result: Result<T, SessionError>) -> Result<T, SessionError> {
        if let Err(err) = &result {
            warn!(error = %err, ?kind, "session operation failed");
            self.inner.record(kind, err);
        }
        result
    }
}

// =============================================================================
// LIFECYCLE TASKS
// =============================================================================

async fn listen_for_init_errors(inner: Arc<Inner>, mut rx: broadcast::Receiver<InitErrorEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                warn!(event = INIT_ERROR_EVENT, error = %event.error, "auth init error signaled");
                let record = ErrorRecord::new(ErrorKind::InitSignaled, &SessionError::InitSignaled(event.error));
                inner.update(|state| {
                    state.fail(record);
                    true
                });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "init error listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn init_timeout_guard(inner: Arc<Inner>) {
    tokio::time::sleep(inner.config.auth_timeout).await;

    let timeout_ms = u64::try_from(inner.config.auth_timeout.as_millis()).unwrap_or(u64::MAX);
    let fired = inner.update(|state| {
        if !state.loading {
            return false;
        }
        state.fail(ErrorRecord::new(ErrorKind::InitTimeout, &SessionError::InitTimeout { timeout_ms }));
        true
    });
    if fired {
        warn!(timeout_ms, "auth initialization timed out");
    }
}

async fn run_setup(inner: Arc<Inner>) {
    let max_retries = inner.config.max_retries;
    let mut retries = 0u32;
    loop {
        match inner.setup_once().await {
            Ok(phase) => {
                info!(?phase, retries, "auth initialized");
                return;
            }
            Err(err) if retries >= max_retries => {
                error!(error = %err, attempts = retries + 1, "auth initialization failed; giving up");
                let record = ErrorRecord::new(ErrorKind::Setup, &err);
                inner.update(|state| {
                    state.fail(record);
                    true
                });
                return;
            }
            Err(err) => {
                retries += 1;
                warn!(error = %err, retry = retries, max_retries, "auth initialization failed; retrying");
                inner.update(|state| {
                    state.retry_count = retries;
                    true
                });
                tokio::time::sleep(inner.config.retry_delay).await;
            }
        }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
