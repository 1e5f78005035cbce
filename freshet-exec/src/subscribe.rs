// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Callback subscription.
//!
//! This module provides the [`SubscribeExt`] trait, which attaches plain
//! callbacks to any [`Publisher`] and hands back a [`SubscriptionHandle`] to
//! steer demand and cancel the run from outside.
//!
//! # Demand
//!
//! [`subscribe_with`](SubscribeExt::subscribe_with) and
//! [`subscribe_next`](SubscribeExt::subscribe_next) request unbounded demand as
//! soon as the run starts. [`subscribe_with_demand`](SubscribeExt::subscribe_with_demand)
//! requests only the initial amount; anything further goes through
//! [`SubscriptionHandle::request`].
//!
//! # Examples
//!
//! ```
//! use freshet_exec::SubscribeExt;
//! use freshet_stream::Flux;
//! use std::sync::{Arc, Mutex};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//!
//! let handle = Flux::from_vec(vec![1, 2, 3]).subscribe_with(
//!     move |value| sink.lock().unwrap().push(value),
//!     |error| panic!("unexpected error: {error}"),
//!     || {},
//! );
//!
//! assert!(handle.is_terminated());
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//! ```

use freshet_core::{
    DeferredSubscription, FreshetError, Publisher, Subscriber, Subscription, SubscriptionRef,
    UNBOUNDED,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle of a callback subscription.
///
/// Cloning the handle shares the same run. Requests and cancellation issued
/// before the publisher has answered with `on_subscribe` are recorded and
/// replayed.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    subscription: Arc<DeferredSubscription>,
    terminated: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    fn new() -> Self {
        Self {
            subscription: Arc::new(DeferredSubscription::new()),
            terminated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Asks the publisher for `n` more values.
    pub fn request(&self, n: u64) {
        self.subscription.request(n);
    }

    /// Stops the run. No callback fires after this returns, except one
    /// already executing on another thread.
    pub fn cancel(&self) {
        self.subscription.cancel();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.subscription.is_cancelled()
    }

    /// Returns `true` once the run delivered its error or completion.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    fn terminate(&self) -> bool {
        !self.terminated.swap(true, Ordering::AcqRel)
    }
}

/// Extension trait attaching callbacks to a publisher.
pub trait SubscribeExt<T>: Publisher<T> {
    /// Subscribes with value, error and completion callbacks and requests
    /// unbounded demand.
    ///
    /// `on_error` and `on_complete` run at most once, and never both.
    fn subscribe_with<N, E, C>(&self, on_next: N, on_error: E, on_complete: C) -> SubscriptionHandle
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(FreshetError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        self.subscribe_with_demand(UNBOUNDED, on_next, on_error, on_complete)
    }

    /// Like [`subscribe_with`](Self::subscribe_with), but requests only
    /// `initial` values up front. With `initial == 0` nothing flows until the
    /// handle requests.
    fn subscribe_with_demand<N, E, C>(
        &self,
        initial: u64,
        on_next: N,
        on_error: E,
        on_complete: C,
    ) -> SubscriptionHandle
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(FreshetError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let handle = SubscriptionHandle::new();
        if initial > 0 {
            handle.request(initial);
        }
        self.subscribe(Box::new(CallbackSubscriber {
            handle: handle.clone(),
            on_next,
            on_error: Some(on_error),
            on_complete: Some(on_complete),
        }));
        handle
    }

    /// Subscribes with a value callback only. Errors nobody handles are
    /// logged.
    fn subscribe_next<N>(&self, on_next: N) -> SubscriptionHandle
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(
            on_next,
            |error| error!("unhandled error in subscription: {}", error),
            || {},
        )
    }
}

impl<T, P> SubscribeExt<T> for P where P: Publisher<T> + ?Sized {}

struct CallbackSubscriber<N, E, C> {
    handle: SubscriptionHandle,
    on_next: N,
    on_error: Option<E>,
    on_complete: Option<C>,
}

impl<T, N, E, C> Subscriber<T> for CallbackSubscriber<N, E, C>
where
    N: FnMut(T) + Send,
    E: FnOnce(FreshetError) + Send,
    C: FnOnce() + Send,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.handle.subscription.set_upstream(subscription);
    }

    fn on_next(&mut self, value: T) {
        if self.handle.is_cancelled() || self.handle.is_terminated() {
            return;
        }
        (self.on_next)(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        if !self.handle.terminate() || self.handle.is_cancelled() {
            return;
        }
        if let Some(on_error) = self.on_error.take() {
            on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.handle.terminate() || self.handle.is_cancelled() {
            return;
        }
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }
}
