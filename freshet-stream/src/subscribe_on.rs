// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Moves the upstream subscription onto a scheduler worker.
//!
//! The downstream receives a [`DeferredSubscription`] immediately; the
//! upstream is subscribed from a spawned task and picks up whatever demand or
//! cancellation was recorded in the meantime.

use freshet_core::{
    BoxSubscriber, DeferredSubscription, FreshetError, Publisher, Subscriber, SubscriptionRef,
};
use freshet_runtime::Scheduler;
use std::sync::Arc;

pub(crate) struct SubscribeOnPublisher<T, S> {
    source: Arc<dyn Publisher<T>>,
    scheduler: S,
}

impl<T, S> SubscribeOnPublisher<T, S>
where
    T: Send + 'static,
    S: Scheduler,
{
    pub(crate) fn new(source: Arc<dyn Publisher<T>>, scheduler: S) -> Self {
        Self { source, scheduler }
    }
}

impl<T, S> Publisher<T> for SubscribeOnPublisher<T, S>
where
    T: Send + 'static,
    S: Scheduler,
{
    fn subscribe(&self, mut subscriber: BoxSubscriber<T>) {
        let deferred = Arc::new(DeferredSubscription::new());
        subscriber.on_subscribe(Arc::clone(&deferred) as SubscriptionRef);

        let source = Arc::clone(&self.source);
        self.scheduler.spawn(async move {
            if deferred.is_cancelled() {
                return;
            }
            source.subscribe(Box::new(WorkerSubscriber {
                downstream: subscriber,
                deferred,
            }));
        });
    }
}

struct WorkerSubscriber<T> {
    downstream: BoxSubscriber<T>,
    deferred: Arc<DeferredSubscription>,
}

impl<T: Send + 'static> Subscriber<T> for WorkerSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.deferred.set_upstream(subscription);
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
