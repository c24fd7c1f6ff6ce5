//! A store that executes effects against a virtual clock.
//!
//! `TestStore` reduces actions exactly like the runtime store, but instead of
//! spawning tasks it queues effects:
//!
//! - `Effect::Future` work is queued and driven by [`TestStore::run_effects`]
//! - `Effect::Delay` timers fire only when [`TestStore::advance`] moves the
//!   virtual clock past their deadline
//! - `Effect::Cancellable` / `Effect::Cancel` drop queued work by id
//!
//! Sequential effects are queued in order, which matches their runtime
//! ordering for the future and delay effects reducers build.

#![allow(clippy::module_name_repetitions)]

use gatecheck_core::effect::{Effect, EffectId};
use gatecheck_core::reducer::Reducer;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

type QueuedFuture<A> = Pin<Box<dyn Future<Output = Option<A>> + Send>>;

struct PendingTimer<A> {
    due: Duration,
    seq: u64,
    action: A,
    ids: Vec<EffectId>,
}

struct PendingFuture<A> {
    future: QueuedFuture<A>,
    ids: Vec<EffectId>,
}

/// Deterministic store for scenario tests
///
/// # Example
///
/// ```ignore
/// let mut store = TestStore::new(reducer, ScannerState::default(), env);
/// store.send(ScannerAction::SessionStarted).await;
/// store.send(frame("TICKET-1")).await;          // validation runs to completion
/// assert_eq!(store.pending_timers(), 1);        // auto-reset scheduled
/// store.advance(Duration::from_secs(5)).await;  // timer fires
/// ```
pub struct TestStore<R>
where
    R: Reducer,
{
    reducer: R,
    environment: R::Environment,
    state: R::State,
    elapsed: Duration,
    seq: u64,
    timers: Vec<PendingTimer<R::Action>>,
    futures: Vec<PendingFuture<R::Action>>,
    history: Vec<R::Action>,
    auto_run: bool,
}

impl<R> TestStore<R>
where
    R: Reducer,
    R::Action: Clone,
{
    /// Create a store that runs queued futures after every `send`
    #[must_use]
    pub fn new(reducer: R, initial_state: R::State, environment: R::Environment) -> Self {
        Self {
            reducer,
            environment,
            state: initial_state,
            elapsed: Duration::ZERO,
            seq: 0,
            timers: Vec::new(),
            futures: Vec::new(),
            history: Vec::new(),
            auto_run: true,
        }
    }

    /// Leave futures queued until [`TestStore::run_effects`] is called
    ///
    /// Lets a test interleave actions with an in-flight request.
    #[must_use]
    pub const fn manual_effects(mut self) -> Self {
        self.auto_run = false;
        self
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    /// Injected environment
    #[must_use]
    pub const fn environment(&self) -> &R::Environment {
        &self.environment
    }

    /// Virtual time elapsed since the store was created
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Every action reduced so far, including those fed back by effects
    #[must_use]
    pub fn history(&self) -> &[R::Action] {
        &self.history
    }

    /// Number of timers that have not fired or been cancelled
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of queued futures that have not run or been cancelled
    #[must_use]
    pub fn pending_futures(&self) -> usize {
        self.futures.len()
    }

    /// Time left until the earliest pending timer fires
    #[must_use]
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.timers
            .iter()
            .map(|t| t.due.saturating_sub(self.elapsed))
            .min()
    }

    /// Reduce `action`, then (unless in manual mode) drive queued futures
    pub async fn send(&mut self, action: R::Action) -> &mut Self {
        self.reduce(action);
        if self.auto_run {
            self.run_effects().await;
        }
        self
    }

    /// Drive queued futures to completion, feeding their actions back
    ///
    /// Futures queued by those actions run too, until the queue is empty.
    pub async fn run_effects(&mut self) -> &mut Self {
        while !self.futures.is_empty() {
            let pending = self.futures.remove(0);
            if let Some(action) = pending.future.await {
                self.reduce(action);
            }
        }
        self
    }

    /// Move the virtual clock forward, firing timers in deadline order
    ///
    /// Futures started by fired actions run before the next timer fires.
    pub async fn advance(&mut self, by: Duration) -> &mut Self {
        let target = self.elapsed + by;

        while let Some(index) = self.next_due(target) {
            let timer = self.timers.remove(index);
            self.elapsed = timer.due;
            self.reduce(timer.action);
            self.run_effects().await;
        }

        self.elapsed = target;
        self
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(index, _)| index)
    }

    fn reduce(&mut self, action: R::Action) {
        self.history.push(action.clone());
        let effects = self
            .reducer
            .reduce(&mut self.state, action, &self.environment);
        for effect in effects {
            self.enqueue(effect, &[]);
        }
    }

    fn enqueue(&mut self, effect: Effect<R::Action>, ids: &[EffectId]) {
        match effect {
            Effect::None => {},
            Effect::Parallel(effects) | Effect::Sequential(effects) => {
                for effect in effects {
                    self.enqueue(effect, ids);
                }
            },
            Effect::Delay { duration, action } => {
                self.seq += 1;
                self.timers.push(PendingTimer {
                    due: self.elapsed + duration,
                    seq: self.seq,
                    action: *action,
                    ids: ids.to_vec(),
                });
            },
            Effect::Future(future) => {
                self.futures.push(PendingFuture {
                    future,
                    ids: ids.to_vec(),
                });
            },
            Effect::Cancellable { id, effect } => {
                self.cancel(id);
                let mut scoped = ids.to_vec();
                scoped.push(id);
                self.enqueue(*effect, &scoped);
            },
            Effect::Cancel(id) => self.cancel(id),
        }
    }

    fn cancel(&mut self, id: EffectId) {
        self.timers.retain(|t| !t.ids.contains(&id));
        self.futures.retain(|f| !f.ids.contains(&id));
    }
}

impl<R> fmt::Debug for TestStore<R>
where
    R: Reducer,
    R::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestStore")
            .field("state", &self.state)
            .field("elapsed", &self.elapsed)
            .field("pending_timers", &self.timers.len())
            .field("pending_futures", &self.futures.len())
            .finish_non_exhaustive()
    }
}
