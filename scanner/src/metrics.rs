//! Scanner metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `scanner.candidates.accepted` - Codes accepted by the detection gate
//! - `scanner.validation.outcomes{outcome}` - Validation outcomes by kind
//! - `scanner.validation.transport_errors{kind}` - Transport failures by kind
//! - `scanner.outcomes.discarded` - Stale outcomes dropped by the reducer
//! - `scanner.feedback.emitted{kind}` - Feedback bundles emitted
//! - `scanner.camera.failures` - Camera failures (permission, open, disconnect)
//! - `scanner.frames.decoded` / `scanner.frames.skipped` - Frame worker throughput
//! - `scanner.session.started` / `scanner.session.stopped` - Session lifecycle
//!
//! ## Histograms
//! - `scanner.validation.duration_seconds` - Validation round-trip time

use metrics::{describe_counter, describe_histogram};

/// Register all scanner metric descriptions.
///
/// Call once at startup, before any metrics are recorded.
pub fn register_scanner_metrics() {
    describe_counter!(
        "scanner.candidates.accepted",
        "Codes accepted by the detection gate and sent for validation"
    );
    describe_counter!(
        "scanner.validation.outcomes",
        "Validation outcomes by kind (valid, invalid, revoked, transport_error, protocol_error)"
    );
    describe_counter!(
        "scanner.validation.transport_errors",
        "Validation transport failures by kind"
    );
    describe_histogram!(
        "scanner.validation.duration_seconds",
        "Time taken by one validation round-trip"
    );
    describe_counter!(
        "scanner.outcomes.discarded",
        "Validation outcomes dropped because a newer attempt or reset superseded them"
    );

    describe_counter!("scanner.feedback.emitted", "Feedback bundles emitted by kind");
    describe_counter!(
        "scanner.camera.failures",
        "Camera permission, open and disconnect failures"
    );

    describe_counter!("scanner.frames.decoded", "Frames passed to the decoder");
    describe_counter!(
        "scanner.frames.skipped",
        "Frames skipped without decoding because the gate was closed"
    );
    describe_counter!("scanner.session.started", "Camera sessions started");
    describe_counter!("scanner.session.stopped", "Camera sessions stopped");
}
