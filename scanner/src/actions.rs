//! Scanner actions.

use crate::error::CameraError;
use crate::types::ValidationOutcome;
use chrono::{DateTime, Utc};

/// Every input to the scan state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerAction {
    /// The camera session started delivering frames
    SessionStarted,

    /// The camera session was stopped by the host
    SessionStopped,

    /// The camera could not be started, or disconnected mid-session
    CameraFailed {
        /// What went wrong
        error: CameraError,
    },

    /// The frame worker decoded a frame
    FrameDecoded {
        /// Decoded payload, `None` when nothing was found
        payload: Option<String>,
        /// When the frame was decoded
        observed_at: DateTime<Utc>,
    },

    /// A validation round-trip finished
    ValidationCompleted {
        /// Attempt the outcome belongs to
        attempt: u64,
        /// The classified result
        outcome: ValidationOutcome,
    },

    /// The auto-reset timer for `attempt` fired
    AutoResetFired {
        /// Attempt whose result is being cleared
        attempt: u64,
    },

    /// The operator pressed reset
    ResetRequested,
}
