// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{
    BoxSubscriber, CancellationToken, DeferredSubscription, FreshetError, Publisher, Subscriber,
    Subscription, SubscriptionRef,
};
use freshet_runtime::{spawn_until_cancelled, Scheduler, Timer};
use freshet_stream::Flux;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing the `delay_subscription` operator.
pub trait DelaySubscriptionExt<T> {
    /// Subscribes to the upstream only after `delay`. The downstream gets its
    /// subscription at once; demand issued during the wait is replayed, and a
    /// cancel during the wait means the upstream is never subscribed.
    fn delay_subscription<S: Scheduler>(&self, delay: Duration, scheduler: S) -> Flux<T>;
}

impl<T: Send + 'static> DelaySubscriptionExt<T> for Flux<T> {
    fn delay_subscription<S: Scheduler>(&self, delay: Duration, scheduler: S) -> Flux<T> {
        Flux::from_publisher(DelaySubscriptionPublisher {
            source: self.clone(),
            delay,
            scheduler,
        })
    }
}

struct DelaySubscriptionPublisher<T, S> {
    source: Flux<T>,
    delay: Duration,
    scheduler: S,
}

impl<T: Send + 'static, S: Scheduler> Publisher<T> for DelaySubscriptionPublisher<T, S> {
    fn subscribe(&self, mut subscriber: BoxSubscriber<T>) {
        let pending = Arc::new(PendingSubscription {
            upstream: DeferredSubscription::new(),
            token: CancellationToken::new(),
        });
        subscriber.on_subscribe(Arc::clone(&pending) as SubscriptionRef);

        let source = self.source.clone();
        let timer = self.scheduler.timer();
        let delay = self.delay;
        spawn_until_cancelled(&self.scheduler, pending.token.clone(), async move {
            timer.sleep_future(delay).await;
            if pending.upstream.is_cancelled() {
                return;
            }
            source.subscribe(Box::new(DelayedSubscriber {
                downstream: subscriber,
                pending,
            }));
        });
    }
}

struct PendingSubscription {
    upstream: DeferredSubscription,
    token: CancellationToken,
}

impl Subscription for PendingSubscription {
    fn request(&self, n: u64) {
        self.upstream.request(n);
    }

    fn cancel(&self) {
        self.token.cancel();
        self.upstream.cancel();
    }
}

struct DelayedSubscriber<T> {
    downstream: BoxSubscriber<T>,
    pending: Arc<PendingSubscription>,
}

impl<T: Send + 'static> Subscriber<T> for DelayedSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.pending.upstream.set_upstream(subscription);
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
