//! Cancellation and timer behaviour of the store, under paused tokio time.

use gatecheck_core::{
    cancellable, delay,
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec, SmallVec,
};
use gatecheck_runtime::{Store, StoreError};
use std::time::Duration;

const TIMER: EffectId = EffectId::new("test.timer");
const REQUEST: EffectId = EffectId::new("test.request");

#[derive(Debug, Clone, PartialEq, Default)]
struct TimerState {
    fired: Vec<u32>,
    completed: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
enum TimerAction {
    Schedule { tag: u32, after: Duration },
    CancelTimer,
    Fired { tag: u32 },
    StartRequest { tag: u32, latency: Duration },
    CancelRequest,
    RequestDone { tag: u32 },
}

#[derive(Debug, Clone)]
struct TimerReducer;

impl Reducer for TimerReducer {
    type State = TimerState;
    type Action = TimerAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut TimerState,
        action: TimerAction,
        _env: &(),
    ) -> SmallVec<[Effect<TimerAction>; 4]> {
        match action {
            TimerAction::Schedule { tag, after } => smallvec![cancellable! {
                id: TIMER,
                effect: delay! { duration: after, action: TimerAction::Fired { tag } }
            }],
            TimerAction::CancelTimer => smallvec![Effect::Cancel(TIMER)],
            TimerAction::Fired { tag } => {
                state.fired.push(tag);
                smallvec![]
            },
            TimerAction::StartRequest { tag, latency } => smallvec![Effect::Future(Box::pin(
                async move {
                    tokio::time::sleep(latency).await;
                    Some(TimerAction::RequestDone { tag })
                }
            ))
            .cancellable(REQUEST)],
            TimerAction::CancelRequest => smallvec![Effect::Cancel(REQUEST)],
            TimerAction::RequestDone { tag } => {
                state.completed.push(tag);
                smallvec![]
            },
        }
    }
}

fn store() -> Store<TimerState, TimerAction, (), TimerReducer> {
    Store::new(TimerState::default(), TimerReducer, ())
}

/// Let spawned effect tasks reach their first await point.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn delay_fires_after_its_duration() {
    let store = store();
    store
        .send(TimerAction::Schedule { tag: 1, after: Duration::from_secs(5) })
        .await
        .unwrap();
    settle().await;

    tokio::time::advance(Duration::from_millis(4_999)).await;
    settle().await;
    assert!(store.state(|s| s.fired.is_empty()).await);

    tokio::time::advance(Duration::from_millis(1)).await;
    settle().await;
    assert_eq!(store.state(|s| s.fired.clone()).await, vec![1]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_timer_never_fires() {
    let store = store();
    store
        .send(TimerAction::Schedule { tag: 1, after: Duration::from_secs(3) })
        .await
        .unwrap();
    store.send(TimerAction::CancelTimer).await.unwrap();

    tokio::time::advance(Duration::from_secs(10)).await;
    settle().await;

    assert!(store.state(|s| s.fired.is_empty()).await);
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn rescheduling_supersedes_previous_timer() {
    let store = store();
    store
        .send(TimerAction::Schedule { tag: 1, after: Duration::from_secs(3) })
        .await
        .unwrap();
    store
        .send(TimerAction::Schedule { tag: 2, after: Duration::from_secs(5) })
        .await
        .unwrap();
    settle().await;

    tokio::time::advance(Duration::from_secs(6)).await;
    settle().await;

    assert_eq!(store.state(|s| s.fired.clone()).await, vec![2]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_request_result_is_discarded() {
    let store = store();
    store
        .send(TimerAction::StartRequest { tag: 7, latency: Duration::from_secs(2) })
        .await
        .unwrap();
    settle().await;
    tokio::time::advance(Duration::from_secs(1)).await;
    store.send(TimerAction::CancelRequest).await.unwrap();

    tokio::time::advance(Duration::from_secs(5)).await;
    settle().await;

    assert!(store.state(|s| s.completed.is_empty()).await);
}

#[tokio::test(start_paused = true)]
async fn send_and_wait_for_observes_effect_action() {
    let store = store();

    let action = store
        .send_and_wait_for(
            TimerAction::StartRequest { tag: 3, latency: Duration::from_millis(200) },
            |a| matches!(a, TimerAction::RequestDone { .. }),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

    assert_eq!(action, TimerAction::RequestDone { tag: 3 });
}

#[tokio::test(start_paused = true)]
async fn send_and_wait_for_times_out_when_cancelled() {
    let store = store();
    let waiter = {
        let store = store.clone();
        tokio::spawn(async move {
            store
                .send_and_wait_for(
                    TimerAction::StartRequest { tag: 4, latency: Duration::from_secs(2) },
                    |a| matches!(a, TimerAction::RequestDone { .. }),
                    Duration::from_secs(3),
                )
                .await
        })
    };
    settle().await;
    store.send(TimerAction::CancelRequest).await.unwrap();

    let result = waiter.await.unwrap();
    assert!(matches!(result, Err(StoreError::Timeout)));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_timers() {
    let store = store();
    store
        .send(TimerAction::Schedule { tag: 1, after: Duration::from_secs(60) })
        .await
        .unwrap();
    assert_eq!(store.pending_effects(), 1);

    store.shutdown(Duration::from_secs(1)).await.unwrap();

    assert_eq!(store.pending_effects(), 0);
    assert!(store.state(|s| s.fired.is_empty()).await);
}

#[tokio::test(start_paused = true)]
async fn watch_state_sees_timer_result() {
    let store = store();
    let mut rx = store.watch_state();
    store
        .send(TimerAction::Schedule { tag: 9, after: Duration::from_millis(100) })
        .await
        .unwrap();
    settle().await;

    tokio::time::advance(Duration::from_millis(100)).await;
    rx.changed().await.unwrap();

    assert_eq!(rx.borrow().fired, vec![9]);
}
