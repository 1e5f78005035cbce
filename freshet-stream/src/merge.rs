// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Interleaving of several sources in arrival order.
//!
//! Every child is subscribed up front and registered in a [`ChildArena`].
//! Downstream demand is broadcast to all children and any surplus they emit is
//! queued in the [`Outlet`], which also serializes children signalling from
//! different threads. The run completes after the last child completes; the
//! first child error is wrapped with the child's index, terminates the run
//! and cancels every other child.

use crate::flux::Flux;
use freshet_core::{
    BoxSubscriber, ChildArena, EmptySubscription, FreshetError, Outlet, Publisher, Subscriber,
    Subscription, SubscriptionRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub(crate) struct MergePublisher<T> {
    sources: Vec<Flux<T>>,
}

impl<T: Send + 'static> MergePublisher<T> {
    pub(crate) fn new(sources: Vec<Flux<T>>) -> Self {
        Self { sources }
    }
}

impl<T: Send + 'static> Publisher<T> for MergePublisher<T> {
    fn subscribe(&self, mut subscriber: BoxSubscriber<T>) {
        if self.sources.is_empty() {
            subscriber.on_subscribe(EmptySubscription::shared());
            subscriber.on_complete();
            return;
        }

        let state = Arc::new(MergeState {
            outlet: Outlet::new(),
            children: ChildArena::with_children(self.sources.len()),
            remaining: AtomicUsize::new(self.sources.len()),
        });
        state.outlet.attach(
            subscriber,
            Arc::new(MergeSubscription {
                state: Arc::clone(&state),
            }),
        );

        for (index, source) in self.sources.iter().enumerate() {
            if state.children.is_cancelled() {
                break;
            }
            source.subscribe(Box::new(MergeChild {
                index,
                state: Arc::clone(&state),
            }));
        }
    }
}

struct MergeState<T> {
    outlet: Outlet<T>,
    children: ChildArena,
    remaining: AtomicUsize,
}

struct MergeSubscription<T> {
    state: Arc<MergeState<T>>,
}

impl<T: Send + 'static> Subscription for MergeSubscription<T> {
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

struct MergeChild<T> {
    index: usize,
    state: Arc<MergeState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for MergeChild<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.children.register(self.index, subscription);
    }

    fn on_next(&mut self, value: T) {
        self.state.outlet.push(value);
    }

    fn on_error(&mut self, error: FreshetError) {
        debug!("merge: source {} failed: {}", self.index, error);
        if self
            .state
            .outlet
            .error(FreshetError::coordinator_failure(self.index, error))
        {
            self.state.children.cancel_all();
        }
    }

    fn on_complete(&mut self) {
        self.state.children.release(self.index);
        if self.state.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.state.outlet.complete();
        }
    }
}
