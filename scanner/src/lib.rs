//! # Gatecheck Scanner
//!
//! QR ticket gate scanner built on the gatecheck reducer runtime.
//!
//! A camera session feeds decoded frames into a [`ScannerStore`]. The
//! [`reducer::ScannerReducer`] throttles them through the detection gate,
//! keeps at most one validation request in flight, maps the service's answer
//! onto a [`types::ScanStatus`], emits feedback and resets itself after a
//! bounded delay.
//!
//! ```text
//! ScannerSession ─frames─▶ ScannerReducer (DetectionGate) ─request─▶ ValidationCoordinator
//!                               ▲                                          │
//!                               └───────────────── outcome ◀───────────────┘
//!                          ScannerReducer ─▶ FeedbackEmitter, AUTO_RESET timer
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let store = ScannerStore::new(
//!     ScannerState::new(config.scan_cooldown),
//!     ScannerReducer::from_config(&config),
//!     environment,
//! );
//! let session = ScannerSession::new(store.clone(), frames, decoder, permission, config.stop_timeout);
//! session.on_surface_changed(true).await?;
//! ```

pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod feedback;
pub mod gate;
pub mod loopback;
pub mod metrics;
pub mod presenter;
pub mod reducer;
pub mod session;
pub mod state;
pub mod types;
pub mod validation;

/// Mock collaborators for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use actions::ScannerAction;
pub use config::ScannerConfig;
pub use environment::ScannerEnvironment;
pub use reducer::ScannerReducer;
pub use session::ScannerSession;
pub use state::ScannerState;

/// The store type driving the scanner
pub type ScannerStore =
    gatecheck_runtime::Store<ScannerState, ScannerAction, ScannerEnvironment, ScannerReducer>;
