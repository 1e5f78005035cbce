// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridge from publishers to `futures` streams.
//!
//! [`PublisherStream`] keeps a window of `prefetch` values requested ahead of
//! the consumer and replaces each value it hands out with `request(1)`. The
//! publisher side never blocks: signals are parked in an unbounded channel
//! whose occupancy is bounded by the demand the stream itself issued.

use freshet_core::{
    DeferredSubscription, FreshetError, Publisher, Result, Signal, Subscriber, Subscription,
    SubscriptionRef, UNBOUNDED,
};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::stream::{Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

/// Number of values a [`PublisherStream`] requests ahead of its consumer.
pub const DEFAULT_PREFETCH: u64 = 32;

/// A publisher run consumed as a [`Stream`] of `Result<T>`.
///
/// The stream ends after the first `Err` or on completion. Dropping it before
/// then cancels the run.
#[derive(Debug)]
pub struct PublisherStream<T> {
    receiver: UnboundedReceiver<Signal<T>>,
    subscription: Arc<DeferredSubscription>,
    replenish: bool,
    done: bool,
}

impl<T> PublisherStream<T> {
    fn finish(&mut self) {
        self.done = true;
        self.receiver.close();
    }
}

impl<T> Stream for PublisherStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        match ready!(self.receiver.poll_next_unpin(cx)) {
            Some(Signal::Next(value)) => {
                if self.replenish {
                    self.subscription.request(1);
                }
                Poll::Ready(Some(Ok(value)))
            }
            Some(Signal::Error(error)) => {
                self.finish();
                Poll::Ready(Some(Err(error)))
            }
            Some(Signal::Complete) | None => {
                self.finish();
                Poll::Ready(None)
            }
        }
    }
}

impl<T> Drop for PublisherStream<T> {
    fn drop(&mut self) {
        if !self.done {
            self.subscription.cancel();
        }
    }
}

struct ChannelSubscriber<T> {
    sender: UnboundedSender<Signal<T>>,
    subscription: Arc<DeferredSubscription>,
}

impl<T: Send> ChannelSubscriber<T> {
    fn send(&mut self, signal: Signal<T>) {
        if self.sender.unbounded_send(signal).is_err() {
            debug!("publisher stream dropped, cancelling its run");
            self.subscription.cancel();
        }
    }
}

impl<T: Send> Subscriber<T> for ChannelSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.subscription.set_upstream(subscription);
    }

    fn on_next(&mut self, value: T) {
        self.send(Signal::Next(value));
    }

    fn on_error(&mut self, error: FreshetError) {
        self.send(Signal::Error(error));
        self.sender.close_channel();
    }

    fn on_complete(&mut self) {
        self.send(Signal::Complete);
        self.sender.close_channel();
    }
}

/// Extension trait consuming a publisher from async code.
pub trait IntoStreamExt<T: Send + 'static>: Publisher<T> {
    /// Starts a run and exposes it as a [`PublisherStream`] with
    /// [`DEFAULT_PREFETCH`] values requested ahead.
    #[allow(clippy::wrong_self_convention)]
    fn into_stream(&self) -> PublisherStream<T> {
        self.into_stream_with_prefetch(DEFAULT_PREFETCH)
    }

    /// Starts a run and exposes it as a [`PublisherStream`] with `prefetch`
    /// values requested ahead. [`UNBOUNDED`] requests everything at once.
    ///
    /// # Panics
    ///
    /// Panics if `prefetch` is zero.
    #[allow(clippy::wrong_self_convention)]
    fn into_stream_with_prefetch(&self, prefetch: u64) -> PublisherStream<T> {
        assert!(prefetch > 0, "into_stream: prefetch must be at least 1");
        let (sender, receiver) = unbounded();
        let subscription = Arc::new(DeferredSubscription::new());
        subscription.request(prefetch);
        self.subscribe(Box::new(ChannelSubscriber {
            sender,
            subscription: Arc::clone(&subscription),
        }));
        PublisherStream {
            receiver,
            subscription,
            replenish: prefetch != UNBOUNDED,
            done: false,
        }
    }

    /// Runs the publisher to completion and gathers its values.
    ///
    /// Resolves to the first error instead if the run fails.
    fn collect_values(self) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        Self: Sized,
    {
        let mut stream = self.into_stream_with_prefetch(UNBOUNDED);
        async move {
            let mut values = Vec::new();
            while let Some(item) = stream.next().await {
                values.push(item?);
            }
            Ok(values)
        }
    }

    /// Runs the publisher to completion, handing every value to `handler`.
    ///
    /// A failing handler does not stop the run: its errors are gathered and
    /// returned as [`FreshetError::MultipleErrors`] once the publisher
    /// completes. An error from the publisher itself is returned at once.
    fn for_each_value<F, E>(self, mut handler: F) -> impl Future<Output = Result<()>> + Send
    where
        Self: Sized,
        F: FnMut(T) -> std::result::Result<(), E> + Send + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut stream = self.into_stream();
        async move {
            let mut failures = Vec::new();
            while let Some(item) = stream.next().await {
                if let Err(error) = handler(item?) {
                    debug!("for_each_value: handler failed: {}", error);
                    failures.push(error);
                }
            }
            if failures.is_empty() {
                Ok(())
            } else {
                Err(FreshetError::from_user_errors(failures))
            }
        }
    }
}

impl<T, P> IntoStreamExt<T> for P
where
    T: Send + 'static,
    P: Publisher<T> + ?Sized,
{
}
