// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{BoxSubscriber, FreshetError, Publisher, Subscriber, SubscriptionRef};
use freshet_runtime::{Scheduler, Timer};
use freshet_stream::Flux;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing the `skip_for` operator.
pub trait SkipForExt<T> {
    /// Drops every value that arrives less than `duration` after the run
    /// subscribed. Each dropped value is replaced upstream with `request(1)`.
    /// Errors and completion pass through at any time.
    fn skip_for<S: Scheduler>(&self, duration: Duration, scheduler: S) -> Flux<T>;
}

impl<T: Send + 'static> SkipForExt<T> for Flux<T> {
    fn skip_for<S: Scheduler>(&self, duration: Duration, scheduler: S) -> Flux<T> {
        Flux::from_publisher(SkipForPublisher {
            source: self.clone(),
            duration,
            scheduler,
        })
    }
}

struct SkipForPublisher<T, S> {
    source: Flux<T>,
    duration: Duration,
    scheduler: S,
}

impl<T: Send + 'static, S: Scheduler> Publisher<T> for SkipForPublisher<T, S> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        let timer = self.scheduler.timer();
        let opens_at = timer.now() + self.duration;
        self.source.subscribe(Box::new(SkipForSubscriber {
            downstream: subscriber,
            timer,
            opens_at,
            open: false,
            upstream: None,
        }));
    }
}

struct SkipForSubscriber<T, TM: Timer> {
    downstream: BoxSubscriber<T>,
    timer: TM,
    opens_at: TM::Instant,
    open: bool,
    upstream: Option<SubscriptionRef>,
}

impl<T: Send + 'static, TM: Timer> Subscriber<T> for SkipForSubscriber<T, TM> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.upstream = Some(Arc::clone(&subscription));
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        if !self.open && self.timer.now() >= self.opens_at {
            self.open = true;
        }
        if self.open {
            self.downstream.on_next(value);
        } else if let Some(upstream) = &self.upstream {
            upstream.request(1);
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        self.downstream.on_error(error);
    }

    fn on_complete(&mut self) {
        self.downstream.on_complete();
    }
}
