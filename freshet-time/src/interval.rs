// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Periodic tick source.
//!
//! Ticks are scheduled against absolute deadlines (`start + k * period`), so a
//! slow subscriber does not make the schedule drift. A tick that finds no
//! outstanding demand cannot be held back: the run fails with
//! [`FreshetError::Overflow`] and the ticking task stops.

use freshet_core::{
    BoxSubscriber, CancellationToken, DemandCounter, FreshetError, Outlet, Publisher,
    Subscription,
};
use freshet_runtime::{spawn_until_cancelled, Scheduler, Timer};
use freshet_stream::Flux;
use std::sync::Arc;
use std::time::Duration;

/// Emits `0, 1, 2, …`, one value per `period`, starting one `period` after
/// subscription. Never completes on its own; bound it with `take` or
/// `take_for`.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn interval<S: Scheduler>(period: Duration, scheduler: S) -> Flux<u64> {
    interval_with_delay(period, period, scheduler)
}

/// Like [`interval`], but the first tick fires after `delay`.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn interval_with_delay<S: Scheduler>(
    delay: Duration,
    period: Duration,
    scheduler: S,
) -> Flux<u64> {
    assert!(!period.is_zero(), "interval: period must be non-zero");
    Flux::from_publisher(IntervalPublisher {
        delay,
        period,
        scheduler,
    })
}

struct IntervalPublisher<S> {
    delay: Duration,
    period: Duration,
    scheduler: S,
}

impl<S: Scheduler> Publisher<u64> for IntervalPublisher<S> {
    fn subscribe(&self, subscriber: BoxSubscriber<u64>) {
        let ticker = Arc::new(Ticker {
            outlet: Outlet::new(),
            demand: DemandCounter::new(),
            token: CancellationToken::new(),
        });
        ticker.outlet.attach(
            subscriber,
            Arc::new(IntervalSubscription {
                ticker: Arc::clone(&ticker),
            }),
        );

        let timer = self.scheduler.timer();
        let period = self.period;
        let mut deadline = timer.now() + self.delay;
        let token = ticker.token.clone();
        spawn_until_cancelled(&self.scheduler, token, async move {
            let mut tick = 0u64;
            loop {
                let now = timer.now();
                if deadline > now {
                    timer.sleep_future(deadline - now).await;
                }
                if !ticker.emit(tick) {
                    return;
                }
                tick = tick.wrapping_add(1);
                deadline = deadline + period;
            }
        });
    }
}

struct Ticker {
    outlet: Outlet<u64>,
    demand: DemandCounter,
    token: CancellationToken,
}

impl Ticker {
    /// Delivers `tick`, or fails the run if nobody asked for it.
    fn emit(&self, tick: u64) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        if self.demand.take_one() {
            self.outlet.push(tick);
            return true;
        }
        self.token.cancel();
        self.outlet.error(FreshetError::overflow(format!(
            "interval could not emit tick {tick} for lack of demand"
        )));
        false
    }
}

struct IntervalSubscription {
    ticker: Arc<Ticker>,
}

impl Subscription for IntervalSubscription {
    fn request(&self, n: u64) {
        // Counted first so a tick racing this request never sees less demand
        // than the outlet
        self.ticker.demand.request(n);
        if !self.ticker.outlet.request(n) {
            self.ticker.token.cancel();
        }
    }

    fn cancel(&self) {
        self.ticker.token.cancel();
        self.ticker.outlet.cancel();
    }
}
