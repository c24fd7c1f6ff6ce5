//! Error types for the scanner.
//!
//! Nothing here is fatal to the process. Camera errors are surfaced once to
//! the presenter, transport errors become validation outcomes, and feedback
//! errors are logged and dropped.

use gatecheck_runtime::StoreError;
use thiserror::Error;

/// Camera acquisition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The user has not granted camera access
    #[error("Camera permission is required for QR scanning")]
    PermissionDenied,

    /// No camera facing the right way exists
    #[error("No suitable camera found")]
    NoSuitableCamera,

    /// The camera exists but could not be opened
    #[error("Error starting camera: {0}")]
    OpenFailed(String),

    /// The frame stream ended mid-session
    #[error("Camera disconnected")]
    Disconnected,
}

/// Failures talking to the validation service
///
/// The display text is the reason shown to the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, reset, ...
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the request timeout
    #[error("Network error: request timed out")]
    Timeout,

    /// The service answered with a non-success HTTP status
    #[error("Validation failed: {0}")]
    Status(u16),

    /// The body could not be parsed as a validation response
    #[error("Network error: malformed response ({0})")]
    Malformed(String),

    /// The request could not be built or the client failed internally
    #[error("Network error: {0}")]
    Client(String),
}

impl TransportError {
    /// Short label used for metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout => "timeout",
            Self::Status(_) => "status",
            Self::Malformed(_) => "malformed",
            Self::Client(_) => "client",
        }
    }
}

/// A tone or haptic primitive failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// Tone playback failed
    #[error("tone playback failed: {0}")]
    Tone(String),

    /// Vibration failed
    #[error("haptic pulse failed: {0}")]
    Haptics(String),
}

/// Errors returned by session start/stop
#[derive(Error, Debug)]
pub enum SessionError {
    /// The camera could not be started
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// The store rejected a lifecycle action
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
