//! Session lifecycle: camera frame delivery in step with the host surface.
//!
//! A session owns one frame worker task. The worker pulls frames from the
//! [`FrameSource`], skips decoding while the gate is closed, decodes, stamps
//! the result with the injected clock and sends it to the store.
//!
//! `start()` and `stop()` are idempotent. `stop()` cancels the worker and
//! waits for it (bounded by the stop timeout, after which the task is
//! aborted) before releasing the frame source, so no worker outlives a
//! pause/resume cycle.

use crate::actions::ScannerAction;
use crate::error::{CameraError, SessionError};
use crate::state::ScannerState;
use crate::ScannerStore;
use futures::future::BoxFuture;
use gatecheck_core::environment::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// An opaque camera frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl Frame {
    /// Wrap raw bytes
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

/// Frames delivered by an open camera. An `Err` item or the end of the
/// stream means the camera went away.
pub type FrameStream = mpsc::Receiver<Result<Frame, CameraError>>;

/// Camera frame acquisition
pub trait FrameSource: Send + Sync {
    /// Open the camera and start delivering frames
    ///
    /// # Errors
    ///
    /// Returns a [`CameraError`] if the camera cannot be opened.
    fn start(&self) -> BoxFuture<'_, Result<FrameStream, CameraError>>;

    /// Release the camera. Safe to call when not started.
    fn stop(&self) -> BoxFuture<'_, ()>;
}

/// QR decoding, best effort per frame
pub trait QrDecoder: Send + Sync {
    /// Decode `frame`, returning `None` when no code was found
    fn decode<'a>(&'a self, frame: &'a Frame) -> BoxFuture<'a, Option<String>>;
}

/// Camera permission check
pub trait CameraPermission: Send + Sync {
    /// Whether the camera may be used
    fn is_granted(&self) -> bool;
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Lifecycle {
    worker: Option<Worker>,
    surface_visible: bool,
}

/// Starts and stops frame delivery
pub struct ScannerSession {
    store: ScannerStore,
    frames: Arc<dyn FrameSource>,
    decoder: Arc<dyn QrDecoder>,
    permission: Arc<dyn CameraPermission>,
    clock: Arc<dyn Clock>,
    stop_timeout: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl ScannerSession {
    /// Create a stopped session
    #[must_use]
    pub fn new(
        store: ScannerStore,
        frames: Arc<dyn FrameSource>,
        decoder: Arc<dyn QrDecoder>,
        permission: Arc<dyn CameraPermission>,
        stop_timeout: Duration,
    ) -> Self {
        let clock = store.environment().clock_handle();
        Self {
            store,
            frames,
            decoder,
            permission,
            clock,
            stop_timeout,
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// The store this session feeds
    #[must_use]
    pub const fn store(&self) -> &ScannerStore {
        &self.store
    }

    /// Whether a frame worker is currently running
    pub async fn is_running(&self) -> bool {
        self.lifecycle
            .lock()
            .await
            .worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Start frame delivery
    ///
    /// Does nothing if a worker is already running. A worker that ended on
    /// its own (camera disconnect) is cleaned up and replaced.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Camera`]: permission denied or the camera failed to
    ///   open; the operator has been notified and the scanner stays `Ready`
    /// - [`SessionError::Store`]: the store is shutting down
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut lifecycle = self.lifecycle.lock().await;

        if let Some(worker) = lifecycle.worker.take() {
            if !worker.handle.is_finished() {
                tracing::debug!("Session already running");
                lifecycle.worker = Some(worker);
                return Ok(());
            }
            tracing::info!("Restarting after camera disconnect");
            self.quiesce(worker).await;
            self.frames.stop().await;
        }

        if !self.permission.is_granted() {
            return self.fail(CameraError::PermissionDenied).await;
        }

        let stream = match self.frames.start().await {
            Ok(stream) => stream,
            Err(error) => {
                self.frames.stop().await;
                return self.fail(error).await;
            },
        };

        if let Err(error) = self.store.send(ScannerAction::SessionStarted).await {
            self.frames.stop().await;
            return Err(error.into());
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_frame_worker(
            self.store.clone(),
            Arc::clone(&self.decoder),
            Arc::clone(&self.clock),
            stream,
            cancel.clone(),
        ));
        lifecycle.worker = Some(Worker { cancel, handle });

        metrics::counter!("scanner.session.started").increment(1);
        tracing::info!("Session started");
        Ok(())
    }

    /// Stop frame delivery
    ///
    /// Does nothing if no session was started.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store rejects `SessionStopped`.
    pub async fn stop(&self) -> Result<(), SessionError> {
        let mut lifecycle = self.lifecycle.lock().await;
        let Some(worker) = lifecycle.worker.take() else {
            tracing::debug!("Session already stopped");
            return Ok(());
        };

        self.quiesce(worker).await;
        self.frames.stop().await;

        metrics::counter!("scanner.session.stopped").increment(1);
        tracing::info!("Session stopped");
        // Held until the store has seen the stop, so a concurrent start()
        // can't slip its SessionStarted in first.
        self.store.send(ScannerAction::SessionStopped).await?;
        drop(lifecycle);
        Ok(())
    }

    /// Host hook: the camera preview surface appeared or went away
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ScannerSession::start`] / [`ScannerSession::stop`].
    pub async fn on_surface_changed(&self, visible: bool) -> Result<(), SessionError> {
        self.lifecycle.lock().await.surface_visible = visible;
        self.sync().await
    }

    /// Host hook: the user answered the camera permission prompt
    ///
    /// # Errors
    ///
    /// Propagates errors from [`ScannerSession::start`] / [`ScannerSession::stop`].
    pub async fn on_permission_result(&self, granted: bool) -> Result<(), SessionError> {
        if granted {
            return self.sync().await;
        }
        self.stop().await?;
        self.fail(CameraError::PermissionDenied).await
    }

    /// Run iff the surface is visible and permission is granted
    async fn sync(&self) -> Result<(), SessionError> {
        let visible = self.lifecycle.lock().await.surface_visible;
        if visible && self.permission.is_granted() {
            self.start().await
        } else {
            self.stop().await
        }
    }

    async fn fail(&self, error: CameraError) -> Result<(), SessionError> {
        tracing::warn!(%error, "Camera unavailable");
        self.store
            .send(ScannerAction::CameraFailed {
                error: error.clone(),
            })
            .await?;
        Err(error.into())
    }

    async fn quiesce(&self, worker: Worker) {
        worker.cancel.cancel();
        let mut handle = worker.handle;

        match tokio::time::timeout(self.stop_timeout, &mut handle).await {
            Ok(Ok(())) => {},
            Ok(Err(error)) => tracing::warn!(%error, "Frame worker ended abnormally"),
            Err(_) => {
                tracing::warn!(timeout = ?self.stop_timeout, "Frame worker did not stop in time, aborting");
                handle.abort();
            },
        }
    }
}

impl std::fmt::Debug for ScannerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerSession")
            .field("stop_timeout", &self.stop_timeout)
            .finish_non_exhaustive()
    }
}

async fn run_frame_worker(
    store: ScannerStore,
    decoder: Arc<dyn QrDecoder>,
    clock: Arc<dyn Clock>,
    mut frames: FrameStream,
    cancel: CancellationToken,
) {
    tracing::debug!("Frame worker started");

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = frames.recv() => next,
        };

        let frame = match next {
            Some(Ok(frame)) => frame,
            Some(Err(error)) => {
                report_disconnect(&store, error).await;
                break;
            },
            None => {
                report_disconnect(&store, CameraError::Disconnected).await;
                break;
            },
        };

        if !store.state(ScannerState::accepts_frames).await {
            metrics::counter!("scanner.frames.skipped").increment(1);
            continue;
        }

        let payload = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            payload = decoder.decode(&frame) => payload,
        };
        metrics::counter!("scanner.frames.decoded").increment(1);

        let Some(payload) = payload else {
            continue;
        };

        let action = ScannerAction::FrameDecoded {
            payload: Some(payload),
            observed_at: clock.now(),
        };
        if let Err(error) = store.send(action).await {
            tracing::debug!(%error, "Store closed, frame worker exiting");
            break;
        }
    }

    tracing::debug!("Frame worker finished");
}

async fn report_disconnect(store: &ScannerStore, error: CameraError) {
    tracing::warn!(%error, "Frame stream ended mid-session");
    if let Err(send_error) = store.send(ScannerAction::CameraFailed { error }).await {
        tracing::debug!(error = %send_error, "Could not report camera failure");
    }
}
