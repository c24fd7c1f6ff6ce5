//! Recording presenter.

use crate::presenter::{Presenter, ScanView};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Default)]
struct Recording {
    views: Vec<ScanView>,
    notices: Vec<String>,
}

/// Records rendered views and error notices
#[derive(Clone, Default)]
pub struct RecordingPresenter {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingPresenter {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Views rendered, in order
    #[must_use]
    pub fn views(&self) -> Vec<ScanView> {
        self.lock().views.clone()
    }

    /// Most recent view
    #[must_use]
    pub fn last_view(&self) -> Option<ScanView> {
        self.lock().views.last().cloned()
    }

    /// Error notices shown, in order
    #[must_use]
    pub fn notices(&self) -> Vec<String> {
        self.lock().notices.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, view: &ScanView) {
        self.lock().views.push(view.clone());
    }

    fn notify_error(&self, message: &str) {
        self.lock().notices.push(message.to_string());
    }
}

impl std::fmt::Debug for RecordingPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingPresenter")
            .field("notices", &self.notices())
            .finish_non_exhaustive()
    }
}
