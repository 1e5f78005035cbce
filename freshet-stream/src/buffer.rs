// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fixed-size windows.
//!
//! Every downstream request for `n` windows becomes a request for
//! `n * size` upstream items. A partial window left at completion is emitted
//! before `on_complete`; a partial window left at an error is discarded.

use crate::flux::Flux;
use freshet_core::demand::multiply_cap;
use freshet_core::{BoxSubscriber, FreshetError, Publisher, Subscriber, Subscription, SubscriptionRef};
use std::mem::replace;
use std::sync::Arc;

pub(crate) struct BufferPublisher<T> {
    source: Flux<T>,
    size: usize,
}

impl<T: Send + 'static> BufferPublisher<T> {
    pub(crate) fn new(source: Flux<T>, size: usize) -> Self {
        assert!(size >= 1, "buffer: window size must be at least 1");
        Self { source, size }
    }
}

impl<T: Send + 'static> Publisher<Vec<T>> for BufferPublisher<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<Vec<T>>) {
        self.source.subscribe(Box::new(BufferSubscriber {
            downstream: subscriber,
            size: self.size,
            window: Vec::with_capacity(self.size),
        }));
    }
}

struct BufferSubscriber<T> {
    downstream: BoxSubscriber<Vec<T>>,
    size: usize,
    window: Vec<T>,
}

impl<T: Send + 'static> Subscriber<T> for BufferSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.downstream.on_subscribe(Arc::new(BufferSubscription {
            upstream: subscription,
            size: self.size as u64,
        }));
    }

    fn on_next(&mut self, value: T) {
        self.window.push(value);
        if self.window.len() >= self.size {
            let window = replace(&mut self.window, Vec::with_capacity(self.size));
            self.downstream.on_next(window);
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        self.window.clear();
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        if !self.window.is_empty() {
            let window = std::mem::take(&mut self.window);
            self.downstream.on_next(window);
        }
        self.downstream.on_complete();
    }
}

struct BufferSubscription {
    upstream: SubscriptionRef,
    size: u64,
}

impl Subscription for BufferSubscription {
    fn request(&self, n: u64) {
        self.upstream.request(multiply_cap(n, self.size));
    }

    fn cancel(&self) {
        self.upstream.cancel();
    }
}
