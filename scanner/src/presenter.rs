//! Presentation seam: the view snapshot and the render loop.

use crate::state::ScannerState;
use crate::types::{ScanStatus, TicketSummary};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What the operator sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanView {
    /// Current status
    pub status: ScanStatus,
    /// Status headline
    pub headline: &'static str,
    /// Reason, camera error, or the status's default detail line
    pub detail: String,
    /// Instruction line
    pub instruction: &'static str,
    /// Ticket details after a valid result
    pub ticket: Option<TicketSummary>,
    /// Whether the manual reset control is shown
    pub reset_available: bool,
    /// Whether the camera session is delivering frames
    pub scanning_enabled: bool,
}

/// Renders views and shows one-shot error notices
pub trait Presenter: Send + Sync {
    /// Draw the current view
    fn render(&self, view: &ScanView);

    /// Show a one-shot error notice (camera failures)
    fn notify_error(&self, message: &str);
}

/// Render every distinct view published on `states`
///
/// The initial state is rendered immediately. The task ends when the store
/// is dropped.
pub fn spawn_render_loop(
    mut states: watch::Receiver<ScannerState>,
    presenter: Arc<dyn Presenter>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = states.borrow_and_update().view();
        presenter.render(&last);

        while states.changed().await.is_ok() {
            let view = states.borrow_and_update().view();
            if view != last {
                presenter.render(&view);
                last = view;
            }
        }
        tracing::debug!("State channel closed, render loop finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingPresenter;

    #[tokio::test]
    async fn renders_initial_and_changed_views_only() {
        let (tx, rx) = watch::channel(ScannerState::default());
        let presenter = RecordingPresenter::new();
        let handle = spawn_render_loop(rx, Arc::new(presenter.clone()));
        tokio::task::yield_now().await;

        // Attempt changes alone don't alter the view
        tx.send_modify(|s| s.attempt += 1);
        tx.send_modify(|s| s.status = ScanStatus::Scanning);
        drop(tx);
        handle.await.unwrap();

        let statuses: Vec<_> = presenter.views().iter().map(|v| v.status).collect();
        assert_eq!(statuses, vec![ScanStatus::Ready, ScanStatus::Scanning]);
    }
}
