// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-bounded window over a run.
//!
//! The window closes either when the spawned deadline task wakes up or when a
//! value arrives past the deadline, whichever comes first. Closing completes
//! the downstream and cancels the upstream exactly once: the [`Outlet`] accepts
//! a single terminal signal.

use freshet_core::{
    BoxSubscriber, CancellationToken, DeferredSubscription, FreshetError, Outlet, Publisher,
    Subscriber, Subscription, SubscriptionRef,
};
use freshet_runtime::{spawn_until_cancelled, Scheduler, Timer};
use freshet_stream::Flux;
use std::sync::Arc;
use std::time::Duration;

/// Extension trait providing the `take_for` operator.
pub trait TakeForExt<T> {
    /// Forwards values until `duration` has elapsed since the run subscribed,
    /// then completes and cancels the upstream, however many values went
    /// through.
    fn take_for<S: Scheduler>(&self, duration: Duration, scheduler: S) -> Flux<T>;
}

impl<T: Send + 'static> TakeForExt<T> for Flux<T> {
    fn take_for<S: Scheduler>(&self, duration: Duration, scheduler: S) -> Flux<T> {
        Flux::from_publisher(TakeForPublisher {
            source: self.clone(),
            duration,
            scheduler,
        })
    }
}

struct TakeForPublisher<T, S> {
    source: Flux<T>,
    duration: Duration,
    scheduler: S,
}

impl<T: Send + 'static, S: Scheduler> Publisher<T> for TakeForPublisher<T, S> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        let window = Arc::new(Window {
            outlet: Outlet::new(),
            upstream: DeferredSubscription::new(),
            token: CancellationToken::new(),
        });
        window.outlet.attach(
            subscriber,
            Arc::new(WindowSubscription {
                window: Arc::clone(&window),
            }),
        );

        let timer = self.scheduler.timer();
        let deadline = timer.now() + self.duration;
        let closer = Arc::clone(&window);
        let sleeper = timer.clone();
        let duration = self.duration;
        spawn_until_cancelled(&self.scheduler, window.token.clone(), async move {
            sleeper.sleep_future(duration).await;
            closer.close();
        });

        self.source.subscribe(Box::new(WindowSubscriber {
            window,
            timer,
            deadline,
        }));
    }
}

struct Window<T> {
    outlet: Outlet<T>,
    upstream: DeferredSubscription,
    token: CancellationToken,
}

impl<T: Send + 'static> Window<T> {
    fn close(&self) {
        self.token.cancel();
        self.upstream.cancel();
        self.outlet.complete();
    }

    fn shut_down(&self) {
        self.token.cancel();
        self.upstream.cancel();
    }
}

struct WindowSubscription<T> {
    window: Arc<Window<T>>,
}

impl<T: Send + 'static> Subscription for WindowSubscription<T> {
    fn request(&self, n: u64) {
        if self.window.outlet.request(n) {
            self.window.upstream.request(n);
        } else {
            self.window.shut_down();
        }
    }

    fn cancel(&self) {
        self.window.outlet.cancel();
        self.window.shut_down();
    }
}

struct WindowSubscriber<T, TM: Timer> {
    window: Arc<Window<T>>,
    timer: TM,
    deadline: TM::Instant,
}

impl<T: Send + 'static, TM: Timer> Subscriber<T> for WindowSubscriber<T, TM> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.window.upstream.set_upstream(subscription);
    }

    fn on_next(&mut self, value: T) {
        if self.timer.now() >= self.deadline {
            self.window.close();
            return;
        }
        self.window.outlet.push(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        self.window.token.cancel();
        self.window.outlet.error(error);
    }

    fn on_complete(&mut self) {
        self.window.token.cancel();
        self.window.outlet.complete();
    }
}
