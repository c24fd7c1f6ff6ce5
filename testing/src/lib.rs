//! # Gatecheck Testing
//!
//! Testing utilities for the gatecheck scanner.
//!
//! This crate provides:
//! - Deterministic clocks (`FixedClock`, `ManualClock`)
//! - `ReducerTest`, a Given-When-Then harness for single reducer steps
//! - `TestStore`, a store that runs effects on a virtual clock
//! - proptest strategies and a tracing initializer for tests
//!
//! ## Example
//!
//! ```ignore
//! use gatecheck_testing::TestStore;
//! use std::time::Duration;
//!
//! #[tokio::test]
//! async fn result_resets_after_five_seconds() {
//!     let mut store = TestStore::new(ScannerReducer::default(), ScannerState::default(), env);
//!
//!     store.send(ScannerAction::SessionStarted).await;
//!     store.advance(Duration::from_secs(5)).await;
//!
//!     assert_eq!(store.state().status, ScanStatus::Ready);
//! }
//! ```

use chrono::{DateTime, Utc};
use gatecheck_core::environment::Clock;

/// Given-When-Then harness for reducers
pub mod reducer_test;
/// Virtual-time store for multi-step scenarios
pub mod test_store;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use gatecheck_testing::mocks::FixedClock;
    /// use gatecheck_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when a test moves it
    ///
    /// Clones share the same time, so a test can hold one handle while the
    /// code under test reads another.
    ///
    /// ```
    /// use gatecheck_testing::mocks::ManualClock;
    /// use gatecheck_core::environment::Clock;
    /// use std::time::Duration;
    ///
    /// let clock = ManualClock::starting_at(gatecheck_testing::test_time());
    /// let before = clock.now();
    /// clock.advance(Duration::from_secs(3));
    /// assert_eq!((clock.now() - before).num_seconds(), 3);
    /// ```
    #[derive(Debug, Clone)]
    pub struct ManualClock {
        time: Arc<Mutex<DateTime<Utc>>>,
    }

    impl ManualClock {
        /// Create a clock frozen at `time`
        #[must_use]
        pub fn starting_at(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(Mutex::new(time)),
            }
        }

        /// Move the clock forward
        ///
        /// Durations beyond chrono's range leave the clock untouched.
        pub fn advance(&self, by: Duration) {
            let Ok(delta) = chrono::Duration::from_std(by) else {
                return;
            };
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += delta;
        }

        /// Jump to an absolute time
        pub fn set(&self, to: DateTime<Utc>) {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner) = to;
        }
    }

    impl Default for ManualClock {
        fn default() -> Self {
            Self::starting_at(super::test_time())
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(super::test_time())
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Output goes through the test harness capture. Honors `RUST_LOG` and
    /// defaults to `debug`. Safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use super::{test_time, DateTime, Utc};
    use proptest::prelude::*;

    /// Strictly increasing timestamps starting at [`test_time`]
    ///
    /// Each gap is between 1 and `max_gap_ms` milliseconds.
    pub fn increasing_instants(
        len: std::ops::Range<usize>,
        max_gap_ms: i64,
    ) -> impl Strategy<Value = Vec<DateTime<Utc>>> {
        prop::collection::vec(1..=max_gap_ms.max(1), len).prop_map(|gaps| {
            gaps.into_iter()
                .scan(test_time(), |at, gap| {
                    *at += chrono::Duration::milliseconds(gap);
                    Some(*at)
                })
                .collect()
        })
    }
}

/// The fixed instant all test clocks start from: 2025-01-01 00:00:00 UTC
#[must_use]
pub fn test_time() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_735_689_600)
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock, ManualClock};
pub use reducer_test::{assertions, ReducerTest};
pub use test_store::TestStore;
