//! Feedback emitter: tone, vibration and status label per scan event.

use crate::error::FeedbackError;
use std::sync::Arc;
use std::time::Duration;

/// Which scan event the operator is being told about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// A code was accepted for validation
    Scan,
    /// The ticket is valid
    Success,
    /// The ticket was rejected or validation failed
    Error,
}

/// Tone played by the audio primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Short neutral beep
    Beep,
    /// Acknowledge
    Ack,
    /// Negative acknowledge
    Nack,
}

/// The bundle of effects for a feedback kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackCue {
    /// Tone to play
    pub tone: Tone,
    /// Tone and vibration length
    pub duration: Duration,
    /// Status label
    pub label: &'static str,
}

impl FeedbackKind {
    /// Tone, duration and label for this kind
    #[must_use]
    pub const fn cue(self) -> FeedbackCue {
        match self {
            Self::Scan => FeedbackCue {
                tone: Tone::Beep,
                duration: Duration::from_millis(100),
                label: "Scanning",
            },
            Self::Success => FeedbackCue {
                tone: Tone::Ack,
                duration: Duration::from_millis(200),
                label: "Accepted",
            },
            Self::Error => FeedbackCue {
                tone: Tone::Nack,
                duration: Duration::from_millis(300),
                label: "Rejected",
            },
        }
    }

    /// Metric label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Audio primitive
pub trait TonePlayer: Send + Sync {
    /// Start `tone` for `duration` without blocking
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::Tone`] if the tone cannot be played.
    fn play(&self, tone: Tone, duration: Duration) -> Result<(), FeedbackError>;
}

/// Vibration primitive
pub trait Haptics: Send + Sync {
    /// Vibrate once for `duration` without blocking
    ///
    /// # Errors
    ///
    /// Returns [`FeedbackError::Haptics`] if the device cannot vibrate.
    fn pulse(&self, duration: Duration) -> Result<(), FeedbackError>;
}

/// Stateless, fire-and-forget feedback
///
/// Primitive failures are logged and swallowed; feedback never affects the
/// scan state machine.
#[derive(Clone)]
pub struct FeedbackEmitter {
    tones: Arc<dyn TonePlayer>,
    haptics: Arc<dyn Haptics>,
}

impl FeedbackEmitter {
    /// Create an emitter over the two primitives
    #[must_use]
    pub fn new(tones: Arc<dyn TonePlayer>, haptics: Arc<dyn Haptics>) -> Self {
        Self { tones, haptics }
    }

    /// Emit the feedback bundle for `kind`
    pub fn emit(&self, kind: FeedbackKind) {
        let cue = kind.cue();
        tracing::debug!(kind = kind.as_str(), label = cue.label, "Feedback");
        metrics::counter!("scanner.feedback.emitted", "kind" => kind.as_str()).increment(1);

        if let Err(error) = self.tones.play(cue.tone, cue.duration) {
            tracing::warn!(%error, kind = kind.as_str(), "Tone feedback failed");
        }
        if let Err(error) = self.haptics.pulse(cue.duration) {
            tracing::warn!(%error, kind = kind.as_str(), "Haptic feedback failed");
        }
    }
}

impl std::fmt::Debug for FeedbackEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackEmitter").finish_non_exhaustive()
    }
}
