use super::*;

#[test]
fn emit_without_listeners_returns_zero() {
    let signals = InitSignals::new();
    assert_eq!(signals.emit("boom"), 0);
}

#[tokio::test]
async fn subscriber_receives_event() {
    let signals = InitSignals::new();
    let mut rx = signals.subscribe();
    assert_eq!(signals.listener_count(), 1);
    assert_eq!(signals.emit("sdk failed to load"), 1);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.error, "sdk failed to load");
}

#[test]
fn dropped_subscriber_is_not_counted() {
    let signals = InitSignals::new();
    let rx = signals.subscribe();
    drop(rx);
    assert_eq!(signals.listener_count(), 0);
}

#[test]
fn signal_envelope_matches_event_contract() {
    let signal: InitErrorSignal = serde_json::from_str(r#"{"detail": {"error": "network down"}}"#).unwrap();
    assert_eq!(signal.detail.error, "network down");
    assert_eq!(INIT_ERROR_EVENT, "firebase-init-error");
}
