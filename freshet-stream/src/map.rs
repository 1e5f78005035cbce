// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Value transformation, infallible or fallible.

use crate::flux::Flux;
use freshet_core::{BoxSubscriber, FreshetError, Publisher, Result, Subscriber, SubscriptionRef};
use std::sync::Arc;

type Transform<T, U> = Arc<dyn Fn(T) -> Result<U> + Send + Sync>;

/// Applies a fallible function to every value.
///
/// An `Err` cancels the upstream and terminates the run with that error.
pub(crate) struct MapPublisher<T, U> {
    source: Flux<T>,
    transform: Transform<T, U>,
}

impl<T, U> MapPublisher<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    pub(crate) fn new<F>(source: Flux<T>, transform: F) -> Self
    where
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        Self {
            source,
            transform: Arc::new(transform),
        }
    }
}

impl<T, U> Publisher<U> for MapPublisher<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<U>) {
        self.source.subscribe(Box::new(MapSubscriber {
            downstream: subscriber,
            transform: Arc::clone(&self.transform),
            upstream: None,
            done: false,
        }));
    }
}

struct MapSubscriber<T, U> {
    downstream: BoxSubscriber<U>,
    transform: Transform<T, U>,
    upstream: Option<SubscriptionRef>,
    done: bool,
}

impl<T, U> Subscriber<T> for MapSubscriber<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.upstream = Some(Arc::clone(&subscription));
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        if self.done {
            return;
        }
        match (self.transform)(value) {
            Ok(mapped) => self.downstream.on_next(mapped),
            Err(error) => {
                self.done = true;
                if let Some(upstream) = self.upstream.take() {
                    upstream.cancel();
                }
                self.downstream.on_error(error);
            }
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        if !self.done {
            self.done = true;
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if !self.done {
            self.done = true;
            self.downstream.on_complete();
        }
    }
}
