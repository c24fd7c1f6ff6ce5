//! Camera-side mocks.

use crate::error::CameraError;
use crate::session::{CameraPermission, FrameSource, FrameStream};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Permission that a test can grant or revoke
#[derive(Debug, Clone)]
pub struct TogglePermission {
    granted: Arc<AtomicBool>,
}

impl TogglePermission {
    /// Permission already granted
    #[must_use]
    pub fn granted() -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Permission not granted
    #[must_use]
    pub fn denied() -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Grant or revoke
    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

impl CameraPermission for TogglePermission {
    fn is_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}

/// Frame source whose camera never opens
#[derive(Debug, Clone)]
pub struct FailingFrameSource {
    error: CameraError,
    stops: Arc<AtomicUsize>,
}

impl FailingFrameSource {
    /// Fail every `start()` with `error`
    #[must_use]
    pub fn new(error: CameraError) -> Self {
        Self {
            error,
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Times the source was released
    #[must_use]
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl FrameSource for FailingFrameSource {
    fn start(&self) -> BoxFuture<'_, Result<FrameStream, CameraError>> {
        let error = self.error.clone();
        Box::pin(async move { Err(error) })
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Box::pin(async {})
    }
}
