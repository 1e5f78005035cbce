// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal reductions to a single value: `collect_list`, `collect_map`,
//! `all`, `any`.
//!
//! The upstream is drained with unbounded demand into a per-run
//! [`Accumulator`]. The single result goes through an [`Outlet`], so it is
//! held back until the downstream has requested at least one item. An
//! accumulator may stop early, in which case the upstream is cancelled.

use crate::flux::Flux;
use freshet_core::{
    BoxSubscriber, DeferredSubscription, FreshetError, Outlet, Publisher, Subscriber,
    Subscription, SubscriptionRef, UNBOUNDED,
};
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::sync::Arc;

/// Per-run state of a reduction.
pub(crate) trait Accumulator<T>: Send + 'static {
    type Output: Send + 'static;

    /// Folds one value in. `Break` ends the reduction with that result.
    fn accept(&mut self, value: T) -> ControlFlow<Self::Output>;

    /// Result at upstream completion.
    fn finish(self) -> Self::Output;
}

pub(crate) struct AggregatePublisher<T, A> {
    source: Flux<T>,
    make: Arc<dyn Fn() -> A + Send + Sync>,
}

impl<T, A> AggregatePublisher<T, A>
where
    T: Send + 'static,
    A: Accumulator<T>,
{
    pub(crate) fn new<F>(source: Flux<T>, make: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            source,
            make: Arc::new(make),
        }
    }
}

impl<T, A> Publisher<A::Output> for AggregatePublisher<T, A>
where
    T: Send + 'static,
    A: Accumulator<T>,
{
    fn subscribe(&self, subscriber: BoxSubscriber<A::Output>) {
        let outlet = Arc::new(Outlet::new());
        let upstream = Arc::new(DeferredSubscription::new());

        outlet.attach(
            subscriber,
            Arc::new(AggregateSubscription {
                outlet: Arc::clone(&outlet),
                upstream: Arc::clone(&upstream),
            }),
        );

        self.source.subscribe(Box::new(AggregateSubscriber {
            accumulator: Some((self.make)()),
            outlet,
            upstream,
        }));
    }
}

struct AggregateSubscriber<A: Accumulator<T>, T> {
    accumulator: Option<A>,
    outlet: Arc<Outlet<A::Output>>,
    upstream: Arc<DeferredSubscription>,
}

impl<T, A> Subscriber<T> for AggregateSubscriber<A, T>
where
    T: Send + 'static,
    A: Accumulator<T>,
{
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.upstream.set_upstream(subscription);
        self.upstream.request(UNBOUNDED);
    }

    fn on_next(&mut self, value: T) {
        let Some(accumulator) = self.accumulator.as_mut() else {
            return;
        };
        if let ControlFlow::Break(result) = accumulator.accept(value) {
            self.accumulator = None;
            self.upstream.cancel();
            self.outlet.push(result);
            self.outlet.complete();
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        if self.accumulator.take().is_some() {
            self.outlet.error(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(accumulator) = self.accumulator.take() {
            self.outlet.push(accumulator.finish());
            self.outlet.complete();
        }
    }
}

struct AggregateSubscription<R> {
    outlet: Arc<Outlet<R>>,
    upstream: Arc<DeferredSubscription>,
}

impl<R: Send + 'static> Subscription for AggregateSubscription<R> {
    fn request(&self, n: u64) {
        if !self.outlet.request(n) {
            self.upstream.cancel();
        }
    }

    fn cancel(&self) {
        self.outlet.cancel();
        self.upstream.cancel();
    }
}

pub(crate) struct CollectList<T>(pub(crate) Vec<T>);

impl<T: Send + 'static> Accumulator<T> for CollectList<T> {
    type Output = Vec<T>;

    fn accept(&mut self, value: T) -> ControlFlow<Vec<T>> {
        self.0.push(value);
        ControlFlow::Continue(())
    }

    fn finish(self) -> Vec<T> {
        self.0
    }
}

/// Key/value projection shared by every run of a `collect_map`.
pub(crate) type Projection<T, K, V> = Arc<dyn Fn(T) -> (K, V) + Send + Sync>;

/// Later values overwrite earlier ones under the same key.
pub(crate) struct CollectMap<T, K, V> {
    pub(crate) entries: HashMap<K, V>,
    pub(crate) project: Projection<T, K, V>,
}

impl<T, K, V> Accumulator<T> for CollectMap<T, K, V>
where
    T: Send + 'static,
    K: Eq + Hash + Send + 'static,
    V: Send + 'static,
{
    type Output = HashMap<K, V>;

    fn accept(&mut self, value: T) -> ControlFlow<HashMap<K, V>> {
        let (key, value) = (self.project)(value);
        self.entries.insert(key, value);
        ControlFlow::Continue(())
    }

    fn finish(self) -> HashMap<K, V> {
        self.entries
    }
}

pub(crate) type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Stops with `false` at the first value failing the predicate.
pub(crate) struct All<T>(pub(crate) Predicate<T>);

impl<T: Send + 'static> Accumulator<T> for All<T> {
    type Output = bool;

    fn accept(&mut self, value: T) -> ControlFlow<bool> {
        if (self.0)(&value) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(false)
        }
    }

    fn finish(self) -> bool {
        true
    }
}

/// Stops with `true` at the first value matching the predicate.
pub(crate) struct Any<T>(pub(crate) Predicate<T>);

impl<T: Send + 'static> Accumulator<T> for Any<T> {
    type Output = bool;

    fn accept(&mut self, value: T) -> ControlFlow<bool> {
        if (self.0)(&value) {
            ControlFlow::Break(true)
        } else {
            ControlFlow::Continue(())
        }
    }

    fn finish(self) -> bool {
        false
    }
}
