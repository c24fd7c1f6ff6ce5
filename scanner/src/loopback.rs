//! In-process collaborators for the console harness.
//!
//! Frames come from a channel fed by the host (stdin lines in the
//! `gatecheck` binary), decoding is plain UTF-8, and feedback and
//! presentation go to the log and stdout.

use crate::environment::DeviceIdentity;
use crate::error::{CameraError, FeedbackError};
use crate::feedback::{Haptics, Tone, TonePlayer};
use crate::presenter::{Presenter, ScanView};
use crate::session::{CameraPermission, Frame, FrameSource, FrameStream, QrDecoder};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

type FrameSender = mpsc::Sender<Result<Frame, CameraError>>;

#[derive(Default)]
struct Shared {
    sender: Mutex<Option<FrameSender>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl Shared {
    fn sender(&self) -> std::sync::MutexGuard<'_, Option<FrameSender>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Frame source backed by a bounded channel
///
/// Every `start()` opens a fresh channel; `stop()` drops its sender. Frames
/// fed while no session is open, or while the channel is full, are dropped
/// like frames from a camera nobody is reading.
#[derive(Clone)]
pub struct ChannelFrameSource {
    shared: Arc<Shared>,
    capacity: usize,
}

/// Host side of a [`ChannelFrameSource`]
#[derive(Clone)]
pub struct FrameFeeder {
    shared: Arc<Shared>,
}

impl ChannelFrameSource {
    /// Create a source and its feeder
    #[must_use]
    pub fn new(capacity: usize) -> (Self, FrameFeeder) {
        let shared = Arc::new(Shared::default());
        (
            Self {
                shared: Arc::clone(&shared),
                capacity: capacity.max(1),
            },
            FrameFeeder { shared },
        )
    }

    /// Times the camera was opened
    #[must_use]
    pub fn starts(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }

    /// Times the camera was released
    #[must_use]
    pub fn stops(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }

    /// Whether a session currently holds the camera
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.sender().is_some()
    }
}

impl FrameSource for ChannelFrameSource {
    fn start(&self) -> BoxFuture<'_, Result<FrameStream, CameraError>> {
        let (tx, rx) = mpsc::channel(self.capacity);
        *self.shared.sender() = Some(tx);
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(rx) })
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        if self.shared.sender().take().is_some() {
            self.shared.stops.fetch_add(1, Ordering::SeqCst);
        }
        Box::pin(async {})
    }
}

impl FrameFeeder {
    /// Offer a frame; returns whether it was queued
    pub fn feed(&self, frame: Frame) -> bool {
        self.shared
            .sender()
            .as_ref()
            .is_some_and(|tx| tx.try_send(Ok(frame)).is_ok())
    }

    /// Simulate the camera going away mid-session
    pub fn disconnect(&self) {
        if let Some(tx) = self.shared.sender().take() {
            let _ = tx.try_send(Err(CameraError::Disconnected));
        }
    }
}

/// Decodes frame bytes as a UTF-8 payload, trimmed
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Decoder;

impl QrDecoder for Utf8Decoder {
    fn decode<'a>(&'a self, frame: &'a Frame) -> BoxFuture<'a, Option<String>> {
        let payload = std::str::from_utf8(&frame.bytes)
            .ok()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        Box::pin(async move { payload })
    }
}

/// Tone player that logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTonePlayer;

impl TonePlayer for LogTonePlayer {
    fn play(&self, tone: Tone, duration: Duration) -> Result<(), FeedbackError> {
        tracing::info!(?tone, duration_ms = duration.as_millis(), "Tone");
        Ok(())
    }
}

/// Haptics that log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&self, duration: Duration) -> Result<(), FeedbackError> {
        tracing::debug!(duration_ms = duration.as_millis(), "Vibrate");
        Ok(())
    }
}

/// Presenter printing to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn render(&self, view: &ScanView) {
        println!("[{}] {}", view.headline, view.detail);
        println!("    {}", view.instruction);
        if let Some(ticket) = &view.ticket {
            println!("    {ticket}");
        }
        if view.reset_available {
            println!("    (type :reset to scan the next ticket)");
        }
        if !view.scanning_enabled {
            println!("    (camera off, type :start)");
        }
    }

    fn notify_error(&self, message: &str) {
        eprintln!("!! {message}");
    }
}

/// Device identity fixed at construction
#[derive(Debug, Clone)]
pub struct StaticDeviceIdentity(String);

impl StaticDeviceIdentity {
    /// Identity reporting `device_id`
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self(device_id.into())
    }

    /// Identity from the `HOSTNAME` environment variable, or a fixed fallback
    #[must_use]
    pub fn from_host() -> Self {
        Self::new(std::env::var("HOSTNAME").unwrap_or_else(|_| "gatecheck-console".to_string()))
    }
}

impl DeviceIdentity for StaticDeviceIdentity {
    fn device_id(&self) -> String {
        self.0.clone()
    }
}

/// Permission that is always granted
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedPermission;

impl CameraPermission for GrantedPermission {
    fn is_granted(&self) -> bool {
        true
    }
}
