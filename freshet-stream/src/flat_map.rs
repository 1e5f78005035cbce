// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Asynchronous flattening of inner publishers.
//!
//! Each outer value is mapped to an inner publisher that is subscribed at
//! once; inner values are interleaved in arrival order through the
//! [`Outlet`]. The `active` counter starts at one for the outer source and
//! gains one per inner, and the run completes when it drops back to zero.
//!
//! With a concurrency cap the outer source is asked for `cap` values up front
//! and for one more each time an inner completes, so at most `cap` inners are
//! ever alive.

use crate::flux::Flux;
use freshet_core::{
    BoxSubscriber, ChildArena, DeferredSubscription, FreshetError, Outlet, Publisher, Subscriber,
    Subscription, SubscriptionRef, UNBOUNDED,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type InnerFactory<T, U> = Arc<dyn Fn(T) -> Flux<U> + Send + Sync>;

pub(crate) struct FlatMapPublisher<T, U> {
    source: Flux<T>,
    make_inner: InnerFactory<T, U>,
    concurrency: Option<usize>,
}

impl<T, U> FlatMapPublisher<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    pub(crate) fn new<F>(source: Flux<T>, make_inner: F, concurrency: Option<usize>) -> Self
    where
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        if let Some(cap) = concurrency {
            assert!(cap >= 1, "flat_map: concurrency must be at least 1");
        }
        Self {
            source,
            make_inner: Arc::new(make_inner),
            concurrency,
        }
    }
}

impl<T, U> Publisher<U> for FlatMapPublisher<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn subscribe(&self, subscriber: BoxSubscriber<U>) {
        let state = Arc::new(FlatMapState {
            outlet: Outlet::new(),
            upstream: DeferredSubscription::new(),
            inners: ChildArena::new(),
            active: AtomicUsize::new(1),
            spawned: AtomicUsize::new(0),
            concurrency: self.concurrency,
        });
        state.outlet.attach(
            subscriber,
            Arc::new(FlatMapSubscription {
                state: Arc::clone(&state),
            }),
        );

        self.source.subscribe(Box::new(OuterSubscriber {
            state,
            make_inner: Arc::clone(&self.make_inner),
        }));
    }
}

struct FlatMapState<U> {
    outlet: Outlet<U>,
    upstream: DeferredSubscription,
    inners: ChildArena,
    active: AtomicUsize,
    spawned: AtomicUsize,
    concurrency: Option<usize>,
}

impl<U: Send + 'static> FlatMapState<U> {
    fn finish_one(&self) {
        if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.outlet.complete();
        }
    }

    fn fail(&self, error: FreshetError) {
        if self.outlet.error(error) {
            self.upstream.cancel();
            self.inners.cancel_all();
        }
    }

    fn cancel(&self) {
        self.upstream.cancel();
        self.inners.cancel_all();
    }
}

struct FlatMapSubscription<U> {
    state: Arc<FlatMapState<U>>,
}

impl<U: Send + 'static> Subscription for FlatMapSubscription<U> {
    fn request(&self, n: u64) {
        if self.state.outlet.request(n) {
            self.state.inners.request_all(n);
        } else {
            self.state.cancel();
        }
    }

    fn cancel(&self) {
        self.state.outlet.cancel();
        self.state.cancel();
    }
}

struct OuterSubscriber<T, U> {
    state: Arc<FlatMapState<U>>,
    make_inner: InnerFactory<T, U>,
}

impl<T, U> Subscriber<T> for OuterSubscriber<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.upstream.set_upstream(subscription);
        let prefetch = self.state.concurrency.map_or(UNBOUNDED, |cap| cap as u64);
        self.state.upstream.request(prefetch);
    }

    fn on_next(&mut self, value: T) {
        if self.state.outlet.is_terminated() {
            return;
        }
        let inner = (self.make_inner)(value);
        self.state.active.fetch_add(1, Ordering::AcqRel);
        let slot = self.state.inners.reserve();
        let ordinal = self.state.spawned.fetch_add(1, Ordering::AcqRel);
        inner.subscribe(Box::new(InnerSubscriber {
            slot,
            ordinal,
            state: Arc::clone(&self.state),
        }));
    }

    fn on_error(&mut self, error: FreshetError) {
        self.state.fail(error);
    }

    fn on_complete(&mut self) {
        self.state.finish_one();
    }
}

struct InnerSubscriber<U> {
    slot: usize,
    ordinal: usize,
    state: Arc<FlatMapState<U>>,
}

impl<U: Send + 'static> Subscriber<U> for InnerSubscriber<U> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.inners.register(self.slot, subscription);
    }

    fn on_next(&mut self, value: U) {
        self.state.outlet.push(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        debug!("flat_map: inner {} failed: {}", self.ordinal, error);
        self.state
            .fail(FreshetError::coordinator_failure(self.ordinal, error));
    }

    fn on_complete(&mut self) {
        self.state.inners.release(self.slot);
        if self.state.concurrency.is_some() && !self.state.outlet.is_terminated() {
            self.state.upstream.request(1);
        }
        self.state.finish_one();
    }
}
