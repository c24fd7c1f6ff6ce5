//! Scanner state.

use crate::error::CameraError;
use crate::gate::DetectionGate;
use crate::presenter::ScanView;
use crate::types::{ScanStatus, TicketSummary};
use std::time::Duration;

/// The scanner's single mutable state, owned by the store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScannerState {
    /// Current user-facing status
    pub status: ScanStatus,
    /// Detection gate
    pub gate: DetectionGate,
    /// Whether the camera session is delivering frames
    pub session_active: bool,
    /// Number of the current validation round
    pub attempt: u64,
    /// Code being validated or whose result is shown
    pub current_code: Option<String>,
    /// Ticket shown after a valid result
    pub ticket: Option<TicketSummary>,
    /// Reason shown after a rejection or failure
    pub reason: Option<String>,
    /// Last camera failure, cleared when a session starts
    pub camera_error: Option<CameraError>,
}

impl ScannerState {
    /// Fresh state with a gate using `cooldown`
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            gate: DetectionGate::new(cooldown),
            ..Self::default()
        }
    }

    /// Whether a decoded frame could currently produce a candidate
    ///
    /// The frame worker checks this before decoding.
    #[must_use]
    pub const fn accepts_frames(&self) -> bool {
        self.session_active && self.gate.is_open()
    }

    /// Return to `Ready`: reopen the gate and clear the shown result
    pub fn enter_ready(&mut self) {
        self.status = ScanStatus::Ready;
        self.current_code = None;
        self.ticket = None;
        self.reason = None;
        self.gate.reset();
    }

    /// Presentation snapshot
    #[must_use]
    pub fn view(&self) -> ScanView {
        let detail = match (&self.reason, &self.camera_error) {
            (Some(reason), _) => reason.clone(),
            (None, Some(error)) if self.status == ScanStatus::Ready => error.to_string(),
            _ => self.status.default_detail().to_string(),
        };

        ScanView {
            status: self.status,
            headline: self.status.headline(),
            detail,
            instruction: self.status.instruction(),
            ticket: self.ticket.clone(),
            reset_available: self.status.offers_reset(),
            scanning_enabled: self.session_active,
        }
    }
}
