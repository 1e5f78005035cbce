// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::demand::add_cap;
use freshet_core::mutex::Mutex;
use freshet_core::{
    BoxSubscriber, FreshetError, Publisher, Subscriber, Subscription, SubscriptionRef,
};
use std::sync::Arc;

#[derive(Debug, Default)]
struct ProbeLog {
    requests: Vec<u64>,
    cancels: usize,
    subscriptions: usize,
}

/// Wraps a publisher and records the demand and cancellation it receives.
///
/// Useful to check what an operator asks of its upstream: `take(2)` must never
/// request more than two items, `filter` replenishes with `request(1)`, a
/// coordinator cancels its children, and so on.
pub struct DemandProbe<T> {
    inner: Arc<dyn Publisher<T>>,
    log: Arc<Mutex<ProbeLog>>,
}

impl<T> Clone for DemandProbe<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            log: Arc::clone(&self.log),
        }
    }
}

impl<T: Send + 'static> DemandProbe<T> {
    pub fn new<P>(publisher: P) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self {
            inner: Arc::new(publisher),
            log: Arc::new(Mutex::new(ProbeLog::default())),
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<u64> {
        self.log.lock().requests.clone()
    }

    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.log.lock().requests.iter().fold(0, |acc, n| add_cap(acc, *n))
    }

    #[must_use]
    pub fn cancels(&self) -> usize {
        self.log.lock().cancels
    }

    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.cancels() > 0
    }

    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.log.lock().subscriptions
    }
}

impl<T: Send + 'static> Publisher<T> for DemandProbe<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        self.log.lock().subscriptions += 1;
        self.inner.subscribe(Box::new(ProbeSubscriber {
            downstream: subscriber,
            log: Arc::clone(&self.log),
        }));
    }
}

struct ProbeSubscriber<T> {
    downstream: BoxSubscriber<T>,
    log: Arc<Mutex<ProbeLog>>,
}

impl<T: Send + 'static> Subscriber<T> for ProbeSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.downstream.on_subscribe(Arc::new(ProbeSubscription {
            upstream: subscription,
            log: Arc::clone(&self.log),
        }));
    }

    fn on_next(&mut self, value: T) {
        self.downstream.on_next(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}

struct ProbeSubscription {
    upstream: SubscriptionRef,
    log: Arc<Mutex<ProbeLog>>,
}

impl Subscription for ProbeSubscription {
    fn request(&self, n: u64) {
        self.log.lock().requests.push(n);
        self.upstream.request(n);
    }

    fn cancel(&self) {
        self.log.lock().cancels += 1;
        self.upstream.cancel();
    }
}
