// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The three roles of the signal protocol.
//!
//! A [`Publisher`] is a reusable recipe. Handing it a [`Subscriber`] starts one
//! run, and the publisher answers with exactly one `on_subscribe` carrying the
//! [`Subscription`] of that run. The subscriber then pulls with
//! [`Subscription::request`] and the publisher pushes at most that many
//! `on_next` calls, followed by at most one terminal `on_error` or
//! `on_complete`.
//!
//! Signals to one subscriber are never concurrent and never reentrant:
//! `on_next` is not called again until the previous call has returned.

use crate::error::FreshetError;
use alloc::boxed::Box;
use alloc::sync::Arc;

/// The demand-tracked, cancellable link of one run.
///
/// Both methods may be called from any thread, including from inside the
/// subscriber's own signal handlers.
pub trait Subscription: Send + Sync {
    /// Allows `n` more values to be emitted. `n == 0` is a protocol fault.
    fn request(&self, n: u64);

    /// Stops the run. Idempotent; after it returns no new value will be
    /// started on this subscription.
    fn cancel(&self);
}

/// Shared handle to a subscription.
pub type SubscriptionRef = Arc<dyn Subscription>;

/// Consumer of one run of a publisher.
pub trait Subscriber<T>: Send {
    /// First signal of every run.
    fn on_subscribe(&mut self, subscription: SubscriptionRef);

    /// A value, only ever delivered against outstanding demand.
    fn on_next(&mut self, value: T);

    /// Terminal failure.
    fn on_error(&mut self, error: FreshetError);

    /// Terminal success.
    fn on_complete(&mut self);
}

/// Owned, type-erased subscriber.
pub type BoxSubscriber<T> = Box<dyn Subscriber<T>>;

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        (**self).on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        (**self).on_next(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        (**self).on_error(error);
    }

    fn on_complete(&mut self) {
        (**self).on_complete();
    }
}

/// A reusable definition of an asynchronous sequence.
///
/// Implementations hold no per-run state: everything a run needs is created
/// inside [`subscribe`](Publisher::subscribe), so the same publisher can be
/// subscribed to any number of times.
pub trait Publisher<T>: Send + Sync {
    /// Starts a new run delivering to `subscriber`.
    fn subscribe(&self, subscriber: BoxSubscriber<T>);
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        (**self).subscribe(subscriber);
    }
}
