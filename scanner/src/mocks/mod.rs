//! Mock collaborators for tests.
//!
//! All mocks are cheap to clone; clones share their recordings so a test can
//! keep one handle and hand another to the code under test.

mod camera;
mod feedback;
mod presenter;
mod validator;

pub use camera::{FailingFrameSource, TogglePermission};
pub use feedback::{FailingHaptics, RecordingFeedback};
pub use presenter::RecordingPresenter;
pub use validator::{response, valid_response, MockValidator};

use crate::environment::ScannerEnvironment;
use crate::types::ScannerIdentity;
use crate::validation::ValidationCoordinator;
use gatecheck_core::environment::{Clock, SystemClock};
use std::sync::Arc;

/// Handles onto the mocks inside a [`test_environment`]
#[derive(Clone, Debug)]
pub struct TestHarness {
    /// The validator behind the coordinator
    pub validator: MockValidator,
    /// Tone and haptic recorder
    pub feedback: RecordingFeedback,
    /// View and notice recorder
    pub presenter: RecordingPresenter,
}

/// Identity used by test environments
#[must_use]
pub fn test_identity() -> ScannerIdentity {
    ScannerIdentity {
        scanner_id: "admin-scanner-001".to_string(),
        location: "Main Gate".to_string(),
        device_id: "test-device".to_string(),
    }
}

/// Environment over mocks, using the system clock
#[must_use]
pub fn test_environment(validator: MockValidator) -> (ScannerEnvironment, TestHarness) {
    test_environment_with_clock(validator, Arc::new(SystemClock))
}

/// Environment over mocks with an explicit clock
#[must_use]
pub fn test_environment_with_clock(
    validator: MockValidator,
    clock: Arc<dyn Clock>,
) -> (ScannerEnvironment, TestHarness) {
    let feedback = RecordingFeedback::new();
    let presenter = RecordingPresenter::new();

    let environment = ScannerEnvironment::new(
        ValidationCoordinator::new(Arc::new(validator.clone())),
        feedback.emitter(),
        Arc::new(presenter.clone()),
        test_identity(),
        clock,
    );

    (
        environment,
        TestHarness {
            validator,
            feedback,
            presenter,
        },
    )
}
