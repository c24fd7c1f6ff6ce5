//! Detection gate: throttles the continuous decode stream.
//!
//! A code held in front of the camera decodes on every frame. The gate turns
//! that stream into at most one [`Candidate`] per cooldown window, and closes
//! in the same call that accepts a candidate so two back-to-back frames can
//! never both pass.

use crate::types::Candidate;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Cooldown between accepted candidates
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(3_000);

/// Open/closed filter with a cooldown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionGate {
    cooldown: chrono::Duration,
    open: bool,
    last_accepted_at: Option<DateTime<Utc>>,
}

impl DetectionGate {
    /// Create an open gate
    ///
    /// Cooldowns beyond chrono's range are clamped to its maximum.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::MAX),
            open: true,
            last_accepted_at: None,
        }
    }

    /// Whether new detections may produce a candidate
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// When the last candidate was accepted
    #[must_use]
    pub const fn last_accepted_at(&self) -> Option<DateTime<Utc>> {
        self.last_accepted_at
    }

    /// Offer a decode result to the gate
    ///
    /// Returns a candidate only when the gate is open, the value is
    /// non-empty, and the cooldown since the last acceptance has elapsed.
    /// Accepting closes the gate.
    pub fn on_frame_decoded(&mut self, raw: Option<&str>, now: DateTime<Utc>) -> Option<Candidate> {
        if !self.open {
            return None;
        }
        let code = raw.filter(|code| !code.is_empty())?;

        if let Some(last) = self.last_accepted_at {
            // A clock that stepped backwards counts as inside the cooldown.
            if now < last || now - last < self.cooldown {
                tracing::trace!(%code, "Detection inside cooldown, dropped");
                return None;
            }
        }

        self.last_accepted_at = Some(now);
        self.open = false;
        Some(Candidate {
            code: code.to_owned(),
            observed_at: now,
        })
    }

    /// Reopen the gate. The cooldown timestamp is kept.
    pub const fn reset(&mut self) {
        self.open = true;
    }

    /// Close the gate without accepting anything
    pub const fn close(&mut self) {
        self.open = false;
    }
}

impl Default for DetectionGate {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
