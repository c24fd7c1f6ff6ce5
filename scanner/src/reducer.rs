//! The scan state machine.
//!
//! ```text
//! Ready ──candidate──▶ Scanning ──valid/invalid/revoked──▶ Valid|Invalid|Revoked ─┐
//!   ▲                     │                                                        │
//!   │                     └──transport/protocol error──▶ Error ────────────────────┤
//!   └──────────────── auto-reset timer or manual reset ◀───────────────────────────┘
//! ```
//!
//! The reducer owns the detection gate, so accepting a candidate and closing
//! the gate happen in one reducer call under the store's write lock. Each
//! accepted candidate starts a new attempt; outcomes and timers carry their
//! attempt number, and anything from an older attempt is dropped.

use crate::actions::ScannerAction;
use crate::config::ScannerConfig;
use crate::environment::ScannerEnvironment;
use crate::feedback::FeedbackKind;
use crate::state::ScannerState;
use crate::types::{ScanStatus, ValidationOutcome, ValidationRequest};
use gatecheck_core::effect::{Effect, EffectId};
use gatecheck_core::reducer::Reducer;
use gatecheck_core::{async_effect, cancellable, delay, fire_and_forget};
use smallvec::{smallvec, SmallVec};
use std::time::Duration;

/// Id of the in-flight validation request
pub const VALIDATION: EffectId = EffectId::new("scanner.validation");

/// Id of the pending auto-reset timer
pub const AUTO_RESET: EffectId = EffectId::new("scanner.auto_reset");

/// Reducer for the scanner
#[derive(Debug, Clone)]
pub struct ScannerReducer {
    result_reset: Duration,
    error_reset: Duration,
}

impl ScannerReducer {
    /// Create a reducer with explicit auto-reset delays
    ///
    /// `result_reset` applies after a verdict (valid, invalid, revoked),
    /// `error_reset` after a transport or protocol failure.
    #[must_use]
    pub const fn new(result_reset: Duration, error_reset: Duration) -> Self {
        Self {
            result_reset,
            error_reset,
        }
    }

    /// Reducer using the configured delays
    #[must_use]
    pub const fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.result_reset, config.error_reset)
    }

    /// Auto-reset delay after `outcome`
    #[must_use]
    pub const fn reset_delay(&self, outcome: &ValidationOutcome) -> Duration {
        if outcome.is_failure() {
            self.error_reset
        } else {
            self.result_reset
        }
    }

    fn feedback(env: &ScannerEnvironment, kind: FeedbackKind) -> Effect<ScannerAction> {
        let feedback = env.feedback().clone();
        fire_and_forget! {
            feedback.emit(kind);
        }
    }

    fn cancel_pending() -> [Effect<ScannerAction>; 2] {
        [Effect::Cancel(VALIDATION), Effect::Cancel(AUTO_RESET)]
    }

    fn on_frame(
        state: &mut ScannerState,
        payload: Option<&str>,
        observed_at: chrono::DateTime<chrono::Utc>,
        env: &ScannerEnvironment,
    ) -> SmallVec<[Effect<ScannerAction>; 4]> {
        if !state.session_active {
            return smallvec![];
        }
        let Some(candidate) = state.gate.on_frame_decoded(payload, observed_at) else {
            return smallvec![];
        };

        state.attempt += 1;
        state.status = ScanStatus::Scanning;
        state.current_code = Some(candidate.code.clone());
        state.ticket = None;
        state.reason = None;

        let attempt = state.attempt;
        tracing::info!(attempt, code = %candidate.code, "Candidate accepted");
        metrics::counter!("scanner.candidates.accepted").increment(1);

        let request = ValidationRequest::new(candidate.code, env.identity());
        let coordinator = env.coordinator().clone();

        smallvec![
            Self::feedback(env, FeedbackKind::Scan),
            cancellable! {
                id: VALIDATION,
                effect: async_effect! {
                    let outcome = coordinator.validate(request).await;
                    Some(ScannerAction::ValidationCompleted { attempt, outcome })
                }
            },
        ]
    }

    fn on_outcome(
        &self,
        state: &mut ScannerState,
        attempt: u64,
        outcome: ValidationOutcome,
        env: &ScannerEnvironment,
    ) -> SmallVec<[Effect<ScannerAction>; 4]> {
        if attempt != state.attempt || state.status != ScanStatus::Scanning {
            tracing::debug!(
                attempt,
                current = state.attempt,
                status = %state.status,
                "Discarding stale validation outcome"
            );
            metrics::counter!("scanner.outcomes.discarded").increment(1);
            return smallvec![];
        }

        let wait = self.reset_delay(&outcome);
        let kind = if matches!(outcome, ValidationOutcome::Valid { .. }) {
            FeedbackKind::Success
        } else {
            FeedbackKind::Error
        };

        state.status = outcome.status();
        match outcome {
            ValidationOutcome::Valid { ticket } => {
                if let Some(ticket) = &ticket {
                    tracing::info!(attempt, %ticket, "Ticket valid");
                } else {
                    tracing::info!(attempt, "Ticket valid (no ticket details)");
                }
                state.ticket = ticket;
            },
            ValidationOutcome::Invalid { reason }
            | ValidationOutcome::Revoked { reason }
            | ValidationOutcome::TransportError { reason }
            | ValidationOutcome::ProtocolError { reason } => {
                tracing::warn!(attempt, status = %state.status, %reason, "Ticket not admitted");
                state.reason = Some(reason);
            },
        }

        smallvec![
            Self::feedback(env, kind),
            cancellable! {
                id: AUTO_RESET,
                effect: delay! {
                    duration: wait,
                    action: ScannerAction::AutoResetFired { attempt }
                }
            },
        ]
    }
}

impl Default for ScannerReducer {
    fn default() -> Self {
        Self::from_config(&ScannerConfig::default())
    }
}

impl Reducer for ScannerReducer {
    type State = ScannerState;
    type Action = ScannerAction;
    type Environment = ScannerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ScannerAction::SessionStarted => {
                tracing::info!("Scanning session started");
                state.session_active = true;
                state.camera_error = None;
                state.enter_ready();
                SmallVec::from_iter(Self::cancel_pending())
            },

            ScannerAction::SessionStopped => {
                tracing::info!("Scanning session stopped");
                state.session_active = false;
                state.enter_ready();
                SmallVec::from_iter(Self::cancel_pending())
            },

            ScannerAction::CameraFailed { error } => {
                tracing::error!(%error, "Camera failure");
                metrics::counter!("scanner.camera.failures").increment(1);

                state.session_active = false;
                state.enter_ready();

                let presenter = env.presenter_handle();
                let message = error.to_string();
                state.camera_error = Some(error);

                let mut effects = SmallVec::from_iter(Self::cancel_pending());
                effects.push(fire_and_forget! {
                    presenter.notify_error(&message);
                });
                effects
            },

            ScannerAction::FrameDecoded {
                payload,
                observed_at,
            } => Self::on_frame(state, payload.as_deref(), observed_at, env),

            ScannerAction::ValidationCompleted { attempt, outcome } => {
                self.on_outcome(state, attempt, outcome, env)
            },

            ScannerAction::AutoResetFired { attempt } => {
                if attempt == state.attempt && state.status.offers_reset() {
                    tracing::debug!(attempt, "Auto-reset");
                    state.enter_ready();
                } else {
                    tracing::debug!(attempt, current = state.attempt, "Ignoring stale auto-reset");
                }
                smallvec![]
            },

            ScannerAction::ResetRequested => {
                tracing::debug!(status = %state.status, "Manual reset");
                state.enter_ready();
                SmallVec::from_iter(Self::cancel_pending())
            },
        }
    }
}
