//! # Gatecheck Runtime
//!
//! Runtime implementation for the gatecheck scanner.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling.
//!
//! ## Core Components
//!
//! - **Store**: owns the state, serializes reducer calls, executes effects
//! - **Effect Executor**: runs effect descriptions on tokio and feeds actions back
//! - **Cancellation registry**: one [`CancellationToken`] per [`EffectId`]
//! - **State watch**: publishes state snapshots for presentation layers
//!
//! ## Example
//!
//! ```ignore
//! use gatecheck_runtime::Store;
//!
//! let store = Store::new(ScannerState::default(), reducer, environment);
//!
//! store.send(ScannerAction::SessionStarted).await?;
//! let status = store.state(|s| s.status).await;
//! ```

use gatecheck_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;

/// Prometheus metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for a matching action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// that action. Actions fed back by those effects get handles of their own.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(ScannerAction::ResetRequested).await?;
/// handle.wait_with_timeout(Duration::from_secs(1)).await?;
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle and the tracking context that feeds it
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait until the effect counter reaches zero
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Internal: cancellation tokens keyed by effect id
#[derive(Clone, Default)]
struct CancellationRegistry {
    tokens: Arc<Mutex<HashMap<EffectId, CancellationToken>>>,
}

impl CancellationRegistry {
    /// Register a fresh token under `id`, cancelling whatever ran there before
    fn register(&self, id: EffectId, parent: Option<&CancellationToken>) -> CancellationToken {
        let token = parent.map_or_else(CancellationToken::new, CancellationToken::child_token);
        let previous = self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, token.clone());
        if let Some(previous) = previous {
            tracing::trace!(effect_id = %id, "Superseding in-flight effect");
            previous.cancel();
        }
        token
    }

    /// Cancel the work registered under `id`, returning whether any existed
    fn cancel(&self, id: EffectId) -> bool {
        let token = self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        token.is_some_and(|token| {
            let live = !token.is_cancelled();
            token.cancel();
            live
        })
    }

    /// Cancel everything
    fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        let count = drained.len();
        for (_, token) in drained {
            token.cancel();
        }
        count
    }
}

/// Store runtime for coordinating reducer execution and effect handling.
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, CancellationRegistry,
        CancellationToken, DecrementGuard, Duration, Effect, EffectHandle, EffectTracking,
        Ordering, Reducer, RwLock, StoreError,
    };
    use tokio::sync::{broadcast, watch};

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; every reducer call holds the write lock, so
    ///    the store is the single logical owner of state)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        cancellations: CancellationRegistry,
        /// Actions produced by effects, broadcast to observers.
        action_broadcast: broadcast::Sender<A>,
        /// Latest state snapshot, republished whenever a reducer changes it.
        state_watch: Arc<watch::Sender<S>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + Clone + PartialEq + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast channel buffers 16 actions; use
        /// [`Store::with_broadcast_capacity`] for more.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Create a new Store with custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity);
            let (state_watch, _) = watch::channel(initial_state.clone());

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                cancellations: CancellationRegistry::default(),
                action_broadcast,
                state_watch: Arc::new(state_watch),
            }
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }

        /// Initiate graceful shutdown of the store
        ///
        /// This method:
        /// 1. Sets the shutdown flag (rejecting new actions)
        /// 2. Cancels every cancellable effect (pending timers, requests)
        /// 3. Waits for the remaining effects to complete (with timeout)
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let cancelled = self.cancellations.cancel_all();
            tracing::debug!(cancelled, "Cancelled in-flight effects");

            let start = tokio::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Publishes the new state if it changed
        /// 4. Executes returned effects asynchronously
        ///
        /// `send()` returns after starting effect execution, not completion.
        /// Concurrent `send()` calls serialize at the reducer.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            metrics::counter!("store.actions.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                // Publish while still holding the lock so observers see
                // snapshots in reducer order.
                self.state_watch.send_if_modified(|published| {
                    if *published == *state {
                        false
                    } else {
                        published.clone_from(&state);
                        true
                    }
                });

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect_internal(effect, tracking.clone(), None);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by effects
        ///
        /// Subscribes to the action broadcast before sending, so a fast
        /// effect cannot race past the subscription.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: no matching action before the timeout
        /// - [`StoreError::ChannelClosed`]: the broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: the store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
            R: Clone,
            E: Clone,
        {
            let mut rx = self.action_broadcast.subscribe();
            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Watch state snapshots
        ///
        /// The receiver always holds the latest state. Intermediate states may
        /// be skipped by slow observers, which suits rendering.
        #[must_use]
        pub fn watch_state(&self) -> watch::Receiver<S> {
            self.state_watch.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let status = store.state(|s| s.status).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Number of effects currently running across all actions
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Execute an effect with tracking
        ///
        /// Uses [`DecrementGuard`] so the effect counters are always
        /// decremented, even if the effect panics.
        ///
        /// `token` is set when the effect runs inside an
        /// [`Effect::Cancellable`]; cancelled work never feeds its action back.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into spawned tasks
        #[allow(clippy::too_many_lines)]
        fn execute_effect_internal(
            &self,
            effect: Effect<A>,
            tracking: EffectTracking,
            token: Option<CancellationToken>,
        ) where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        let _pending_guard = pending_guard;

                        let action = match &token {
                            Some(token) => tokio::select! {
                                biased;
                                () = token.cancelled() => {
                                    tracing::trace!("Effect::Future cancelled");
                                    return;
                                },
                                action = fut => action,
                            },
                            None => fut.await,
                        };

                        store.feed_back(action, token.as_ref()).await;
                    });
                },
                Effect::Delay { duration, action } => {
                    tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);
                    tracking.increment();

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        let _pending_guard = pending_guard;

                        match &token {
                            Some(token) => tokio::select! {
                                biased;
                                () = token.cancelled() => {
                                    tracing::trace!("Effect::Delay cancelled");
                                    return;
                                },
                                () = tokio::time::sleep(duration) => {},
                            },
                            None => tokio::time::sleep(duration).await,
                        }

                        store.feed_back(Some(*action), token.as_ref()).await;
                    });
                },
                Effect::Parallel(effects) => {
                    tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);

                    for effect in effects {
                        self.execute_effect_internal(effect, tracking.clone(), token.clone());
                    }
                },
                Effect::Sequential(effects) => {
                    let effect_count = effects.len();
                    tracing::trace!("Executing Effect::Sequential with {} effects", effect_count);
                    metrics::counter!("store.effects.executed", "type" => "sequential")
                        .increment(1);
                    tracking.increment();

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking);
                        let _pending_guard = pending_guard;

                        for (idx, effect) in effects.into_iter().enumerate() {
                            if token.as_ref().is_some_and(CancellationToken::is_cancelled) {
                                tracing::trace!("Effect::Sequential cancelled before step {}", idx + 1);
                                return;
                            }

                            let (mut sub_handle, sub_tracking) = EffectHandle::new();
                            store.execute_effect_internal(effect, sub_tracking, token.clone());
                            sub_handle.wait().await;
                        }
                        tracing::trace!("Effect::Sequential completed");
                    });
                },
                Effect::Cancellable { id, effect } => {
                    tracing::trace!(effect_id = %id, "Executing Effect::Cancellable");
                    metrics::counter!("store.effects.executed", "type" => "cancellable")
                        .increment(1);

                    let token = self.cancellations.register(id, token.as_ref());
                    self.execute_effect_internal(*effect, tracking, Some(token));
                },
                Effect::Cancel(id) => {
                    let cancelled = self.cancellations.cancel(id);
                    tracing::trace!(effect_id = %id, cancelled, "Executing Effect::Cancel");
                    metrics::counter!("store.effects.executed", "type" => "cancel").increment(1);
                },
            }
        }

        /// Deliver an action produced by an effect, unless its work was cancelled
        async fn feed_back(&self, action: Option<A>, token: Option<&CancellationToken>)
        where
            R: Clone,
            E: Clone,
        {
            let Some(action) = action else {
                tracing::trace!("Effect completed with no action");
                return;
            };

            if token.is_some_and(CancellationToken::is_cancelled) {
                tracing::trace!("Dropping action from cancelled effect");
                metrics::counter!("store.effects.discarded").increment(1);
                return;
            }

            let _ = self.action_broadcast.send(action.clone());

            if let Err(error) = self.send(action).await {
                tracing::debug!(%error, "Effect action not delivered");
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                cancellations: self.cancellations.clone(),
                action_broadcast: self.action_broadcast.clone(),
                state_watch: Arc::clone(&self.state_watch),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
