// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Race between sources: the first one to signal anything owns the run.
//!
//! Sources are subscribed in declaration order and a signal claims the run
//! with a single compare-and-swap, so synchronous sources resolve ties in
//! favour of the earlier one. Once claimed, every other child is cancelled and
//! late subscribers are rejected by the arena. The winner's signals, errors
//! included, are forwarded unchanged.

use crate::flux::Flux;
use freshet_core::{
    BoxSubscriber, ChildArena, EmptySubscription, FreshetError, Outlet, Publisher, Subscriber,
    Subscription, SubscriptionRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const UNCLAIMED: usize = usize::MAX;

pub(crate) struct FirstPublisher<T> {
    sources: Vec<Flux<T>>,
}

impl<T: Send + 'static> FirstPublisher<T> {
    pub(crate) fn new(sources: Vec<Flux<T>>) -> Self {
        Self { sources }
    }
}

impl<T: Send + 'static> Publisher<T> for FirstPublisher<T> {
    fn subscribe(&self, mut subscriber: BoxSubscriber<T>) {
        if self.sources.is_empty() {
            subscriber.on_subscribe(EmptySubscription::shared());
            subscriber.on_complete();
            return;
        }

        let state = Arc::new(RaceState {
            outlet: Outlet::new(),
            children: ChildArena::with_children(self.sources.len()),
            winner: AtomicUsize::new(UNCLAIMED),
        });
        state.outlet.attach(
            subscriber,
            Arc::new(RaceSubscription {
                state: Arc::clone(&state),
            }),
        );

        for (index, source) in self.sources.iter().enumerate() {
            if state.children.is_cancelled() || state.is_claimed_by_other(index) {
                break;
            }
            source.subscribe(Box::new(RaceChild {
                index,
                state: Arc::clone(&state),
            }));
        }
    }
}

struct RaceState<T> {
    outlet: Outlet<T>,
    children: ChildArena,
    winner: AtomicUsize,
}

impl<T: Send + 'static> RaceState<T> {
    /// Returns `true` if `index` owns the run, claiming it if still open.
    fn claim(&self, index: usize) -> bool {
        match self
            .winner
            .compare_exchange(UNCLAIMED, index, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!("first: source {} won the race", index);
                self.children.cancel_others(index);
                true
            }
            Err(winner) => winner == index,
        }
    }

    fn is_claimed_by_other(&self, index: usize) -> bool {
        let winner = self.winner.load(Ordering::Acquire);
        winner != UNCLAIMED && winner != index
    }
}

struct RaceSubscription<T> {
    state: Arc<RaceState<T>>,
}

impl<T: Send + 'static> Subscription for RaceSubscription<T> {
    fn request(&self, n: u64) {
        if self.state.outlet.request(n) {
            self.state.children.request_all(n);
        } else {
            self.state.children.cancel_all();
        }
    }

    fn cancel(&self) {
        self.state.outlet.cancel();
        self.state.children.cancel_all();
    }
}

struct RaceChild<T> {
    index: usize,
    state: Arc<RaceState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for RaceChild<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        if self.state.is_claimed_by_other(self.index) {
            subscription.cancel();
            return;
        }
        self.state.children.register(self.index, subscription);
    }

    fn on_next(&mut self, value: T) {
        if self.state.claim(self.index) {
            self.state.outlet.push(value);
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        if self.state.claim(self.index) {
            self.state.outlet.error(error);
        }
    }

    fn on_complete(&mut self) {
        if self.state.claim(self.index) {
            self.state.outlet.complete();
        }
    }
}
