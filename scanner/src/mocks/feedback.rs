//! Recording feedback primitives.

use crate::error::FeedbackError;
use crate::feedback::{FeedbackEmitter, Haptics, Tone, TonePlayer};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Default)]
struct Recording {
    tones: Vec<(Tone, Duration)>,
    pulses: Vec<Duration>,
}

/// Records every tone and pulse
#[derive(Clone, Default)]
pub struct RecordingFeedback {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingFeedback {
    /// Empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitter that plays and pulses into this recorder
    #[must_use]
    pub fn emitter(&self) -> FeedbackEmitter {
        FeedbackEmitter::new(Arc::new(self.clone()), Arc::new(self.clone()))
    }

    /// Tones played, in order
    #[must_use]
    pub fn tones(&self) -> Vec<(Tone, Duration)> {
        self.lock().tones.clone()
    }

    /// Only the tone kinds, in order
    #[must_use]
    pub fn tone_kinds(&self) -> Vec<Tone> {
        self.lock().tones.iter().map(|(tone, _)| *tone).collect()
    }

    /// Pulses, in order
    #[must_use]
    pub fn pulses(&self) -> Vec<Duration> {
        self.lock().pulses.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TonePlayer for RecordingFeedback {
    fn play(&self, tone: Tone, duration: Duration) -> Result<(), FeedbackError> {
        self.lock().tones.push((tone, duration));
        Ok(())
    }
}

impl Haptics for RecordingFeedback {
    fn pulse(&self, duration: Duration) -> Result<(), FeedbackError> {
        self.lock().pulses.push(duration);
        Ok(())
    }
}

impl std::fmt::Debug for RecordingFeedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingFeedback")
            .field("tones", &self.tones())
            .finish_non_exhaustive()
    }
}

/// Haptics that always fail
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingHaptics;

impl Haptics for FailingHaptics {
    fn pulse(&self, _duration: Duration) -> Result<(), FeedbackError> {
        Err(FeedbackError::Haptics("no vibrator".to_string()))
    }
}
