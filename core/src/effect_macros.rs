//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when reducers build `Effect` values,
//! particularly for network calls, timers and cancellation.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use gatecheck_core::async_effect;
///
/// async_effect! {
///     let outcome = coordinator.validate(request).await;
///     Some(ScannerAction::ValidationCompleted { attempt, outcome })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use gatecheck_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(5),
///     action: ScannerAction::AutoResetFired { attempt }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Cancellable` registered under an id
///
/// # Example
///
/// ```rust,ignore
/// use gatecheck_core::{cancellable, delay};
///
/// cancellable! {
///     id: AUTO_RESET,
///     effect: delay! { duration: wait, action: ScannerAction::AutoResetFired { attempt } }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $id,
            effect: ::std::boxed::Box::new($effect),
        }
    };
}

/// Create an `Effect::Future` that runs a side effect and feeds nothing back
///
/// # Example
///
/// ```rust,ignore
/// use gatecheck_core::fire_and_forget;
///
/// fire_and_forget! {
///     feedback.emit(FeedbackKind::Scan);
/// }
/// ```
#[macro_export]
macro_rules! fire_and_forget {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move {
                $($body)*
                ::std::option::Option::None
            })
        )
    };
}
