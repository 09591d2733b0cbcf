//! Init-error signal bus.
//!
//! SYSTEM CONTEXT
//! ==============
//! Whatever boots the identity SDK reports a failed start by emitting a
//! `firebase-init-error` event with `{detail: {error}}`. Mounted session
//! managers subscribe and turn the event into session state.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const INIT_ERROR_EVENT: &str = "firebase-init-error";

const SIGNAL_CAPACITY: usize = 16;

/// Payload of an init-error event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitErrorEvent {
    pub error: String,
}

/// Wire envelope: `{"detail": {"error": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitErrorSignal {
    pub detail: InitErrorEvent,
}

#[derive(Clone)]
pub struct InitSignals {
    tx: broadcast::Sender<InitErrorEvent>,
}

impl InitSignals {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { tx }
    }

    /// Deliver an init error to every current listener. Returns how many
    /// listeners received it; zero is not an error.
    pub fn emit(&self, error: impl Into<String>) -> usize {
        let event = InitErrorEvent { error: error.into() };
        self.tx.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<InitErrorEvent> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InitSignals {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "signals_test.rs"]
mod tests;
