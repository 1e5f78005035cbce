// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! `take(n)`: the first `n` values, then completion.
//!
//! Downstream requests are capped so that no more than `n` items are ever
//! requested upstream in total. `take(0)` completes downstream and cancels the
//! upstream before any demand reaches it.

use crate::flux::Flux;
use freshet_core::{
    BoxSubscriber, EmptySubscription, FreshetError, Publisher, Subscriber, Subscription,
    SubscriptionRef,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub(crate) struct TakePublisher<T> {
    source: Flux<T>,
    limit: u64,
}

impl<T: Send + 'static> TakePublisher<T> {
    pub(crate) fn new(source: Flux<T>, limit: u64) -> Self {
        Self { source, limit }
    }
}

impl<T: Send + 'static> Publisher<T> for TakePublisher<T> {
    fn subscribe(&self, mut subscriber: BoxSubscriber<T>) {
        if self.limit == 0 {
            subscriber.on_subscribe(EmptySubscription::shared());
            subscriber.on_complete();
            self.source.subscribe(Box::new(CancelOnSubscribe));
            return;
        }
        self.source.subscribe(Box::new(TakeSubscriber {
            downstream: subscriber,
            limit: self.limit,
            remaining: self.limit,
            upstream: None,
        }));
    }
}

struct TakeSubscriber<T> {
    downstream: BoxSubscriber<T>,
    limit: u64,
    remaining: u64,
    upstream: Option<SubscriptionRef>,
}

impl<T: Send + 'static> Subscriber<T> for TakeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.upstream = Some(Arc::clone(&subscription));
        self.downstream.on_subscribe(Arc::new(TakeSubscription {
            upstream: subscription,
            limit: self.limit,
            issued: AtomicU64::new(0),
        }));
    }

    fn on_next(&mut self, value: T) {
        if self.remaining == 0 {
            return;
        }
        self.remaining -= 1;
        self.downstream.on_next(value);
        if self.remaining == 0 {
            if let Some(upstream) = self.upstream.take() {
                upstream.cancel();
            }
            self.downstream.on_complete();
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        if self.remaining > 0 {
            self.remaining = 0;
            self.downstream.on_error(error);
        }
    }

    fn on_complete(&mut self) {
        if self.remaining > 0 {
            self.remaining = 0;
            self.downstream.on_complete();
        }
    }
}

struct TakeSubscription {
    upstream: SubscriptionRef,
    limit: u64,
    issued: AtomicU64,
}

impl Subscription for TakeSubscription {
    fn request(&self, n: u64) {
        if n == 0 {
            self.upstream.request(0);
            return;
        }
        let mut issued = self.issued.load(Ordering::Acquire);
        loop {
            let grant = n.min(self.limit - issued);
            if grant == 0 {
                return;
            }
            match self.issued.compare_exchange_weak(
                issued,
                issued + grant,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    self.upstream.request(grant);
                    return;
                }
                Err(actual) => issued = actual,
            }
        }
    }

    fn cancel(&self) {
        self.upstream.cancel();
    }
}

struct CancelOnSubscribe;

impl<T> Subscriber<T> for CancelOnSubscribe {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        subscription.cancel();
    }

    fn on_next(&mut self, _value: T) {}

    fn on_error(&mut self, _error: FreshetError) {}

    fn on_complete(&mut self) {}
}
