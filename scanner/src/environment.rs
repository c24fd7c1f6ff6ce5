//! Injected collaborators for the scanner reducer.

use crate::config::ScannerConfig;
use crate::feedback::FeedbackEmitter;
use crate::presenter::Presenter;
use crate::types::ScannerIdentity;
use crate::validation::ValidationCoordinator;
use gatecheck_core::environment::Clock;
use std::sync::Arc;

/// Host device identity lookup
pub trait DeviceIdentity: Send + Sync {
    /// Stable id of this device
    fn device_id(&self) -> String;
}

impl ScannerIdentity {
    /// Identity from configuration, asking the host for the device id when
    /// the configuration doesn't pin one
    #[must_use]
    pub fn resolve(config: &ScannerConfig, device: &dyn DeviceIdentity) -> Self {
        Self {
            scanner_id: config.admin_id.clone(),
            location: config.location.clone(),
            device_id: config
                .device_id
                .clone()
                .unwrap_or_else(|| device.device_id()),
        }
    }
}

/// Everything the scanner reducer needs from the outside world
#[derive(Clone)]
pub struct ScannerEnvironment {
    coordinator: ValidationCoordinator,
    feedback: FeedbackEmitter,
    presenter: Arc<dyn Presenter>,
    identity: ScannerIdentity,
    clock: Arc<dyn Clock>,
}

impl ScannerEnvironment {
    /// Create a new scanner environment
    #[must_use]
    pub fn new(
        coordinator: ValidationCoordinator,
        feedback: FeedbackEmitter,
        presenter: Arc<dyn Presenter>,
        identity: ScannerIdentity,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coordinator,
            feedback,
            presenter,
            identity,
            clock,
        }
    }

    /// Validation coordinator
    #[must_use]
    pub const fn coordinator(&self) -> &ValidationCoordinator {
        &self.coordinator
    }

    /// Feedback emitter
    #[must_use]
    pub const fn feedback(&self) -> &FeedbackEmitter {
        &self.feedback
    }

    /// Presenter
    #[must_use]
    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    /// Shared handle to the presenter
    #[must_use]
    pub fn presenter_handle(&self) -> Arc<dyn Presenter> {
        Arc::clone(&self.presenter)
    }

    /// Who is scanning, and where
    #[must_use]
    pub const fn identity(&self) -> &ScannerIdentity {
        &self.identity
    }

    /// Clock
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Shared handle to the clock
    #[must_use]
    pub fn clock_handle(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}

impl std::fmt::Debug for ScannerEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerEnvironment")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
