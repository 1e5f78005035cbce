// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Signal logging stage.

use crate::flux::Flux;
use freshet_core::{BoxSubscriber, FreshetError, Publisher, Subscriber, Subscription, SubscriptionRef};
use std::fmt::Debug;
use std::sync::Arc;

/// Logs every signal passing through, and every request and cancel going
/// back up, under `category`.
pub(crate) struct LogPublisher<T> {
    source: Flux<T>,
    category: Arc<str>,
}

impl<T: Debug + Send + 'static> LogPublisher<T> {
    pub(crate) fn new(source: Flux<T>, category: &str) -> Self {
        Self {
            source,
            category: Arc::from(category),
        }
    }
}

impl<T: Debug + Send + 'static> Publisher<T> for LogPublisher<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        self.source.subscribe(Box::new(LogSubscriber {
            downstream: subscriber,
            category: Arc::clone(&self.category),
        }));
    }
}

struct LogSubscriber<T> {
    downstream: BoxSubscriber<T>,
    category: Arc<str>,
}

impl<T: Debug + Send + 'static> Subscriber<T> for LogSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        info!("[{}] on_subscribe", self.category);
        self.downstream.on_subscribe(Arc::new(LogSubscription {
            upstream: subscription,
            category: Arc::clone(&self.category),
        }));
    }

    fn on_next(&mut self, value: T) {
        info!("[{}] on_next({:?})", self.category, value);
        self.downstream.on_next(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        error!("[{}] on_error({})", self.category, error);
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        info!("[{}] on_complete()", self.category);
        self.downstream.on_complete();
    }
}

struct LogSubscription {
    upstream: SubscriptionRef,
    category: Arc<str>,
}

impl Subscription for LogSubscription {
    fn request(&self, n: u64) {
        if n == freshet_core::UNBOUNDED {
            info!("[{}] request(unbounded)", self.category);
        } else {
            info!("[{}] request({})", self.category, n);
        }
        self.upstream.request(n);
    }

    fn cancel(&self) {
        info!("[{}] cancel()", self.category);
        self.upstream.cancel();
    }
}
