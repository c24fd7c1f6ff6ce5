//! End-to-end scan scenarios on a virtual clock.

use gatecheck_scanner::error::TransportError;
use gatecheck_scanner::feedback::Tone;
use gatecheck_scanner::mocks::{
    response, test_environment, valid_response, MockValidator, TestHarness,
};
use gatecheck_scanner::types::{ScanStatus, TicketSummary, ValidationOutcome};
use gatecheck_scanner::{ScannerAction, ScannerReducer, ScannerState};
use gatecheck_testing::{test_time, TestStore};
use std::time::Duration;

type Store = TestStore<ScannerReducer>;

fn store(validator: MockValidator) -> (Store, TestHarness) {
    let (environment, harness) = test_environment(validator);
    let store = TestStore::new(
        ScannerReducer::default(),
        ScannerState::new(Duration::from_millis(3_000)),
        environment,
    );
    (store, harness)
}

/// A frame decoded at the store's current virtual time
fn frame(store: &Store, code: &str) -> ScannerAction {
    let elapsed = chrono::Duration::from_std(store.elapsed()).unwrap();
    ScannerAction::FrameDecoded {
        payload: Some(code.to_string()),
        observed_at: test_time() + elapsed,
    }
}

fn auto_resets(store: &Store) -> usize {
    store
        .history()
        .iter()
        .filter(|a| matches!(a, ScannerAction::AutoResetFired { .. }))
        .count()
}

#[tokio::test]
async fn scenario_a_valid_ticket_then_auto_reset() {
    let validator = MockValidator::new().respond(valid_response(42, "Summer Fest", "Jane Doe"));
    let (store, harness) = store(validator);
    let mut store = store.manual_effects();
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;
    assert_eq!(store.state().status, ScanStatus::Scanning);
    assert!(!store.state().gate.is_open());

    store.run_effects().await;
    let state = store.state();
    assert_eq!(state.status, ScanStatus::Valid);
    assert_eq!(
        state.ticket,
        Some(TicketSummary {
            number: 42,
            event_name: "Summer Fest".into(),
            holder_name: "Jane Doe".into(),
            entry_type: "General".into(),
        })
    );
    assert!(!state.gate.is_open());
    assert_eq!(harness.feedback.tone_kinds(), vec![Tone::Beep, Tone::Ack]);

    let request = &harness.validator.requests()[0];
    assert_eq!(request.code, "TICKET-001");
    assert_eq!(request.scanner_id, "admin-scanner-001");
    assert_eq!(request.location, "Main Gate");

    store.advance(Duration::from_millis(4_999)).await;
    assert_eq!(store.state().status, ScanStatus::Valid);

    store.advance(Duration::from_millis(1)).await;
    assert_eq!(store.state().status, ScanStatus::Ready);
    assert!(store.state().gate.is_open());
    assert_eq!(store.state().ticket, None);
}

#[tokio::test]
async fn scenario_b_repeat_inside_cooldown_is_dropped() {
    let validator = MockValidator::new().respond(valid_response(42, "Summer Fest", "Jane Doe"));
    let (mut store, harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let first = frame(&store, "TICKET-001");
    store.send(first).await;
    store.advance(Duration::from_millis(1_000)).await;
    let repeat = frame(&store, "TICKET-001");
    store.send(repeat).await;

    assert_eq!(harness.validator.calls(), 1);
    assert_eq!(store.state().attempt, 1);
    assert_eq!(store.state().status, ScanStatus::Valid);
}

#[tokio::test]
async fn scenario_b_cooldown_outlives_the_result_window() {
    let validator = MockValidator::new()
        .fail(TransportError::Timeout)
        .respond(response("invalid", Some("expired")));
    let (mut store, harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let first = frame(&store, "TICKET-001");
    store.send(first).await;
    store.advance(Duration::from_millis(1_000)).await;
    store.send(ScannerAction::ResetRequested).await;

    // Gate is open again but the cooldown still holds
    let early = frame(&store, "TICKET-002");
    store.send(early).await;
    assert_eq!(harness.validator.calls(), 1);

    store.advance(Duration::from_millis(2_000)).await;
    let late = frame(&store, "TICKET-002");
    store.send(late).await;
    assert_eq!(harness.validator.calls(), 2);
    assert_eq!(store.state().status, ScanStatus::Invalid);
    assert_eq!(store.state().reason.as_deref(), Some("Invalid ticket: expired"));
}

#[tokio::test]
async fn scenario_c_transport_error_resets_after_three_seconds() {
    let validator = MockValidator::new().fail(TransportError::Timeout);
    let (mut store, harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;
    assert_eq!(store.state().status, ScanStatus::Error);
    assert_eq!(
        store.state().reason.as_deref(),
        Some("Network error: request timed out")
    );
    assert_eq!(harness.feedback.tone_kinds(), vec![Tone::Beep, Tone::Nack]);
    assert_eq!(store.next_timer_in(), Some(Duration::from_millis(3_000)));

    store.advance(Duration::from_millis(2_999)).await;
    assert_eq!(store.state().status, ScanStatus::Error);

    store.advance(Duration::from_millis(1)).await;
    assert_eq!(store.state().status, ScanStatus::Ready);
}

#[tokio::test]
async fn scenario_d_manual_reset_disarms_timer() {
    let validator = MockValidator::new().respond(valid_response(42, "Summer Fest", "Jane Doe"));
    let (mut store, _harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;
    assert_eq!(store.state().status, ScanStatus::Valid);
    assert_eq!(store.pending_timers(), 1);

    store.advance(Duration::from_millis(1_000)).await;
    store.send(ScannerAction::ResetRequested).await;
    assert_eq!(store.state().status, ScanStatus::Ready);
    assert_eq!(store.pending_timers(), 0);

    let transitions = store.history().len();
    store.advance(Duration::from_millis(10_000)).await;

    assert_eq!(store.state().status, ScanStatus::Ready);
    assert_eq!(store.history().len(), transitions);
    assert_eq!(auto_resets(&store), 0);
}

#[tokio::test]
async fn scenario_e_unknown_result_is_protocol_error() {
    let validator = MockValidator::new().respond(response("pending", None));
    let (mut store, harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;

    assert_eq!(store.state().status, ScanStatus::Error);
    assert_eq!(
        store.state().reason.as_deref(),
        Some("Unknown validation result: pending")
    );
    assert!(store.history().iter().any(|a| matches!(
        a,
        ScannerAction::ValidationCompleted {
            outcome: ValidationOutcome::ProtocolError { .. },
            ..
        }
    )));
    assert_eq!(harness.feedback.tone_kinds(), vec![Tone::Beep, Tone::Nack]);
    assert_eq!(store.next_timer_in(), Some(Duration::from_millis(3_000)));
}

#[tokio::test]
async fn revoked_ticket_keeps_result_window() {
    let validator = MockValidator::new().respond(response("revoked", Some("reported stolen")));
    let (mut store, _harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;

    assert_eq!(store.state().status, ScanStatus::Revoked);
    assert_eq!(
        store.state().view().detail,
        "Ticket revoked: reported stolen"
    );
    assert_eq!(store.next_timer_in(), Some(Duration::from_millis(5_000)));
}

#[tokio::test]
async fn gate_stays_closed_until_ready() {
    let validator = MockValidator::new().respond(response("invalid", None));
    let (store, _harness) = store(validator);
    let mut store = store.manual_effects();
    store.send(ScannerAction::SessionStarted).await;
    assert!(store.state().gate.is_open());

    let action = frame(&store, "TICKET-001");
    store.send(action).await;
    assert!(!store.state().gate.is_open());

    store.run_effects().await;
    assert_eq!(store.state().status, ScanStatus::Invalid);
    assert!(!store.state().gate.is_open());

    store.advance(Duration::from_millis(4_999)).await;
    assert!(!store.state().gate.is_open());

    store.advance(Duration::from_millis(1)).await;
    assert!(store.state().gate.is_open());
    assert_eq!(store.state().status, ScanStatus::Ready);
}

#[tokio::test]
async fn stop_cancels_in_flight_validation() {
    let validator = MockValidator::new().respond(valid_response(1, "Expo", "Kim"));
    let (store, harness) = store(validator);
    let mut store = store.manual_effects();
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;
    store.send(ScannerAction::SessionStopped).await;
    store.run_effects().await;

    assert_eq!(store.pending_futures(), 0);
    assert_eq!(store.state().status, ScanStatus::Ready);
    assert!(!store.state().session_active);
    assert_eq!(harness.validator.calls(), 0);
    assert_eq!(store.pending_timers(), 0);
}

#[tokio::test]
async fn stop_during_result_window_disarms_auto_reset() {
    let validator = MockValidator::new().respond(valid_response(42, "Summer Fest", "Jane Doe"));
    let (mut store, _harness) = store(validator);
    store.send(ScannerAction::SessionStarted).await;

    let action = frame(&store, "TICKET-001");
    store.send(action).await;
    assert_eq!(store.state().status, ScanStatus::Valid);
    assert_eq!(store.pending_timers(), 1);

    store.advance(Duration::from_millis(1_000)).await;
    store.send(ScannerAction::SessionStopped).await;
    assert_eq!(store.pending_timers(), 0);

    store.advance(Duration::from_secs(10)).await;

    assert_eq!(store.pending_timers(), 0);
    assert_eq!(auto_resets(&store), 0);
    assert_eq!(store.state().status, ScanStatus::Ready);
    assert!(!store.state().session_active);
}

#[tokio::test]
async fn late_outcome_from_previous_session_is_discarded() {
    let validator = MockValidator::new().respond(response("invalid", Some("expired")));
    let (store, _harness) = store(validator);
    let mut store = store.manual_effects();

    store.send(ScannerAction::SessionStarted).await;
    let first = frame(&store, "TICKET-001");
    store.send(first).await;
    assert_eq!(store.state().attempt, 1);

    store.send(ScannerAction::SessionStopped).await;
    store.send(ScannerAction::SessionStarted).await;
    store.advance(Duration::from_millis(3_000)).await;
    let second = frame(&store, "TICKET-002");
    store.send(second).await;
    assert_eq!(store.state().attempt, 2);
    assert_eq!(store.state().status, ScanStatus::Scanning);

    // Attempt 1's answer shows up while attempt 2 is in flight
    store
        .send(ScannerAction::ValidationCompleted {
            attempt: 1,
            outcome: ValidationOutcome::Valid { ticket: None },
        })
        .await;

    assert_eq!(store.state().status, ScanStatus::Scanning);
    assert_eq!(store.state().current_code.as_deref(), Some("TICKET-002"));
    assert_eq!(store.pending_timers(), 0);

    store.run_effects().await;
    assert_eq!(store.state().status, ScanStatus::Invalid);
    assert_eq!(store.state().reason.as_deref(), Some("Invalid ticket: expired"));
}

#[tokio::test]
async fn frames_ignored_without_session() {
    let (mut store, harness) = store(MockValidator::new());

    let action = frame(&store, "TICKET-001");
    store.send(action).await;

    assert_eq!(store.state().status, ScanStatus::Ready);
    assert_eq!(harness.validator.calls(), 0);
    assert!(harness.feedback.tones().is_empty());
}
