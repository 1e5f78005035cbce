// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serial per-element delay.
//!
//! One value is in flight at a time: the upstream is asked for a single item
//! only when the downstream has demand and the previous value has been
//! released, so consecutive values leave at least `delay` apart. Completion
//! received while a value is still waiting is held until that value is out;
//! errors skip the wait.

use freshet_core::mutex::Mutex;
use freshet_core::{
    BoxSubscriber, CancellationToken, DeferredSubscription, DemandCounter, FreshetError,
    Outlet, Publisher, Subscriber, Subscription, SubscriptionRef,
};
use freshet_runtime::{spawn_until_cancelled, Scheduler, Timer};
use freshet_stream::Flux;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing the `delay_elements` operator.
pub trait DelayElementsExt<T> {
    /// Emits every value `delay` after it was received, one at a time.
    fn delay_elements<S: Scheduler>(&self, delay: Duration, scheduler: S) -> Flux<T>;
}

impl<T: Send + 'static> DelayElementsExt<T> for Flux<T> {
    fn delay_elements<S: Scheduler>(&self, delay: Duration, scheduler: S) -> Flux<T> {
        Flux::from_publisher(DelayElementsPublisher {
            source: self.clone(),
            delay,
            scheduler,
        })
    }
}

struct DelayElementsPublisher<T, S> {
    source: Flux<T>,
    delay: Duration,
    scheduler: S,
}

impl<T: Send + 'static, S: Scheduler> Publisher<T> for DelayElementsPublisher<T, S> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        let state = Arc::new(DelayState {
            outlet: Outlet::new(),
            upstream: DeferredSubscription::new(),
            token: CancellationToken::new(),
            wanted: DemandCounter::new(),
            flow: Mutex::new(Flow::default()),
            delay: self.delay,
            scheduler: self.scheduler.clone(),
        });
        state.outlet.attach(
            subscriber,
            Arc::new(DelaySubscription {
                state: Arc::clone(&state),
            }),
        );
        self.source.subscribe(Box::new(DelaySubscriber { state }));
    }
}

#[derive(Default)]
struct Flow {
    in_flight: bool,
    upstream_done: bool,
}

struct DelayState<T, S> {
    outlet: Outlet<T>,
    upstream: DeferredSubscription,
    token: CancellationToken,
    wanted: DemandCounter,
    flow: Mutex<Flow>,
    delay: Duration,
    scheduler: S,
}

impl<T: Send + 'static, S: Scheduler> DelayState<T, S> {
    /// Asks the upstream for the next value if the slot is free and the
    /// downstream wants one.
    fn pull(&self) {
        {
            let mut flow = self.flow.lock();
            if flow.in_flight || flow.upstream_done || !self.wanted.take_one() {
                return;
            }
            flow.in_flight = true;
        }
        self.upstream.request(1);
    }

    fn hold(self: &Arc<Self>, value: T) {
        let state = Arc::clone(self);
        let timer = self.scheduler.timer();
        let delay = self.delay;
        spawn_until_cancelled(&self.scheduler, self.token.clone(), async move {
            timer.sleep_future(delay).await;
            state.release(value);
        });
    }

    fn release(&self, value: T) {
        self.outlet.push(value);
        let finished = {
            let mut flow = self.flow.lock();
            flow.in_flight = false;
            flow.upstream_done
        };
        if finished {
            self.token.cancel();
            self.outlet.complete();
        } else {
            self.pull();
        }
    }

    fn shut_down(&self) {
        self.token.cancel();
        self.upstream.cancel();
    }
}

struct DelaySubscription<T, S> {
    state: Arc<DelayState<T, S>>,
}

impl<T: Send + 'static, S: Scheduler> Subscription for DelaySubscription<T, S> {
    fn request(&self, n: u64) {
        if self.state.outlet.request(n) {
            self.state.wanted.request(n);
            self.state.pull();
        } else {
            self.state.shut_down();
        }
    }

    fn cancel(&self) {
        self.state.outlet.cancel();
        self.state.shut_down();
    }
}

struct DelaySubscriber<T, S> {
    state: Arc<DelayState<T, S>>,
}

impl<T: Send + 'static, S: Scheduler> Subscriber<T> for DelaySubscriber<T, S> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set_upstream(subscription);
    }

    fn on_next(&mut self, value: T) {
        if self.state.outlet.is_terminated() {
            return;
        }
        self.state.hold(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        self.state.token.cancel();
        self.state.outlet.error(error);
    }

    fn on_complete(&mut self) {
        let idle = {
            let mut flow = self.state.flow.lock();
            flow.upstream_done = true;
            !flow.in_flight
        };
        if idle {
            self.state.token.cancel();
            self.state.outlet.complete();
        }
    }
}
