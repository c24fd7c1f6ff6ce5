//! `start()` racing a `stop()` that is still in flight.
//!
//! Runs in its own test binary: it installs a global subscriber whose layer
//! stalls the stopping thread on the "Session stopped" event, holding the
//! stop open long enough for a concurrent `start()` to arrive.

use gatecheck_scanner::loopback::{ChannelFrameSource, Utf8Decoder};
use gatecheck_scanner::mocks::{test_environment, MockValidator, TogglePermission};
use gatecheck_scanner::{ScannerReducer, ScannerSession, ScannerState, ScannerStore};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

struct StallOnStop;

#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for StallOnStop {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = Message::default();
        event.record(&mut message);
        if message.0 == "Session stopped" {
            std::thread::sleep(Duration::from_millis(50));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn start_during_stop_leaves_session_consistent() {
    tracing_subscriber::registry().with(StallOnStop).init();

    let (environment, _harness) = test_environment(MockValidator::new());
    let store = ScannerStore::new(
        ScannerState::new(Duration::from_millis(3_000)),
        ScannerReducer::default(),
        environment,
    );
    let (source, _feeder) = ChannelFrameSource::new(8);
    let session = Arc::new(ScannerSession::new(
        store.clone(),
        Arc::new(source),
        Arc::new(Utf8Decoder),
        Arc::new(TogglePermission::granted()),
        Duration::from_millis(500),
    ));

    session.start().await.unwrap();

    let stopping = Arc::clone(&session);
    let stop = tokio::spawn(async move { stopping.stop().await });
    tokio::time::sleep(Duration::from_millis(10)).await;
    session.start().await.unwrap();
    stop.await.unwrap().unwrap();

    let running = session.is_running().await;
    let state = store.state(Clone::clone).await;
    assert!(running);
    assert_eq!(running, state.session_active);
    assert!(state.accepts_frames());

    session.stop().await.unwrap();
}
