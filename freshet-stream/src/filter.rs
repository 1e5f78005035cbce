// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Stages that drop some values: `filter`, `skip`, `distinct`, `distinct_by`.
//!
//! They share one subscriber. Each run asks the publisher for a fresh gate, so
//! per-run state (a skip counter, a seen-set) starts empty on every
//! subscription. A dropped value was paid for with one unit of demand, which
//! is handed back upstream with `request(1)`.

use crate::flux::Flux;
use freshet_core::{BoxSubscriber, FreshetError, Publisher, Subscriber, SubscriptionRef};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

/// Per-run decision: `true` forwards the value, `false` drops it.
pub(crate) type Gate<T> = Box<dyn FnMut(&T) -> bool + Send>;

type GateFactory<T> = Arc<dyn Fn() -> Gate<T> + Send + Sync>;

pub(crate) struct FilterPublisher<T> {
    source: Flux<T>,
    make_gate: GateFactory<T>,
}

impl<T: Send + 'static> FilterPublisher<T> {
    pub(crate) fn new<F>(source: Flux<T>, make_gate: F) -> Self
    where
        F: Fn() -> Gate<T> + Send + Sync + 'static,
    {
        Self {
            source,
            make_gate: Arc::new(make_gate),
        }
    }

    pub(crate) fn predicate<P>(source: Flux<T>, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Self::new(source, move || {
            let predicate = Arc::clone(&predicate);
            Box::new(move |value: &T| predicate(value)) as Gate<T>
        })
    }

    pub(crate) fn skip(source: Flux<T>, count: usize) -> Self {
        Self::new(source, move || {
            let mut remaining = count;
            Box::new(move |_: &T| {
                if remaining == 0 {
                    return true;
                }
                remaining -= 1;
                false
            }) as Gate<T>
        })
    }

    pub(crate) fn distinct_by<K, F>(source: Flux<T>, key: F) -> Self
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        let key = Arc::new(key);
        Self::new(source, move || {
            let key = Arc::clone(&key);
            let mut seen = HashSet::new();
            Box::new(move |value: &T| seen.insert(key(value))) as Gate<T>
        })
    }
}

impl<T: Send + 'static> Publisher<T> for FilterPublisher<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        self.source.subscribe(Box::new(FilterSubscriber {
            downstream: subscriber,
            gate: (self.make_gate)(),
            upstream: None,
        }));
    }
}

struct FilterSubscriber<T> {
    downstream: BoxSubscriber<T>,
    gate: Gate<T>,
    upstream: Option<SubscriptionRef>,
}

impl<T: Send + 'static> Subscriber<T> for FilterSubscriber<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.upstream = Some(Arc::clone(&subscription));
        self.downstream.on_subscribe(subscription);
    }

    fn on_next(&mut self, value: T) {
        if (self.gate)(&value) {
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
