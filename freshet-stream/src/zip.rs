// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Index-aligned combination of several sources.
//!
//! Each child has a queue of values waiting for a partner. A row is formed as
//! soon as every queue holds a value and is offered to the [`Outlet`] while the
//! queues are still locked, so rows leave in index order whichever thread
//! completed them. The run completes once some child has completed with an
//! empty queue: no further row can ever be formed.
//!
//! Downstream demand is not forwarded to the children. Once every child is
//! subscribed and the downstream has asked for something, each child gets
//! [`ZIP_PREFETCH`] requests, and every row delivered downstream asks each
//! child for one more. A child therefore never runs more than the prefetch
//! ahead of what the downstream consumed, whatever its requested amount.

use crate::flux::Flux;
use freshet_core::mutex::Mutex;
use freshet_core::{
    BoxSubscriber, ChildArena, EmptySubscription, FreshetError, Outlet, Publisher, Subscriber,
    Subscription, SubscriptionRef,
};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

/// Values requested ahead from each child of a zip.
const ZIP_PREFETCH: u64 = 32;

pub(crate) struct ZipPublisher<T> {
    sources: Vec<Flux<T>>,
}

impl<T: Send + 'static> ZipPublisher<T> {
    pub(crate) fn new(sources: Vec<Flux<T>>) -> Self {
        Self { sources }
    }
}

impl<T: Send + 'static> Publisher<Vec<T>> for ZipPublisher<T> {
    fn subscribe(&self, mut subscriber: BoxSubscriber<Vec<T>>) {
        let width = self.sources.len();
        if width == 0 {
            subscriber.on_subscribe(EmptySubscription::shared());
            subscriber.on_complete();
            return;
        }

        let state = Arc::new(ZipState {
            outlet: Outlet::new(),
            children: ChildArena::with_children(width),
            rows: Mutex::new(Rows {
                queues: (0..width).map(|_| VecDeque::new()).collect(),
                completed: vec![false; width],
            }),
            priming: Mutex::new(Priming::default()),
            width,
        });
        state.outlet.attach(
            Box::new(ZipDownstream {
                inner: subscriber,
                state: Arc::downgrade(&state),
            }),
            Arc::new(ZipSubscription {
                state: Arc::clone(&state),
            }),
        );

        for (index, source) in self.sources.iter().enumerate() {
            if state.children.is_cancelled() {
                break;
            }
            source.subscribe(Box::new(ZipChild {
                index,
                state: Arc::clone(&state),
            }));
        }

        let prime = {
            let mut priming = state.priming.lock();
            priming.subscribed = true;
            priming.take_start()
        };
        if prime {
            state.prime();
        }
    }
}

/// Gate for the first round of child demand: every child must be subscribed
/// and the downstream must have requested.
#[derive(Default)]
struct Priming {
    subscribed: bool,
    demanded: bool,
    started: bool,
}

impl Priming {
    fn take_start(&mut self) -> bool {
        if self.started || !self.subscribed || !self.demanded {
            return false;
        }
        self.started = true;
        true
    }
}

struct Rows<T> {
    queues: Vec<VecDeque<T>>,
    completed: Vec<bool>,
}

impl<T> Rows<T> {
    fn next_row(&mut self) -> Option<Vec<T>> {
        if self.queues.iter().any(VecDeque::is_empty) {
            return None;
        }
        self.queues.iter_mut().map(VecDeque::pop_front).collect()
    }

    fn exhausted(&self) -> bool {
        self.completed
            .iter()
            .zip(&self.queues)
            .any(|(completed, queue)| *completed && queue.is_empty())
    }
}

struct ZipState<T> {
    outlet: Outlet<Vec<T>>,
    children: ChildArena,
    rows: Mutex<Rows<T>>,
    priming: Mutex<Priming>,
    width: usize,
}

impl<T: Send + 'static> ZipState<T> {
    fn prime(&self) {
        for index in 0..self.width {
            self.children.request(index, ZIP_PREFETCH);
        }
    }

    fn replenish(&self) {
        for index in 0..self.width {
            self.children.request(index, 1);
        }
    }

    fn finish(&self) {
        self.children.cancel_all();
        self.outlet.complete();
    }
}

struct ZipSubscription<T> {
    state: Arc<ZipState<T>>,
}

impl<T: Send + 'static> Subscription for ZipSubscription<T> {
    fn request(&self, n: u64) {
        if self.state.outlet.request(n) {
            let prime = {
                let mut priming = self.state.priming.lock();
                priming.demanded = true;
                priming.take_start()
            };
            if prime {
                self.state.prime();
            }
        } else {
            self.state.children.cancel_all();
        }
    }

    fn cancel(&self) {
        self.state.outlet.cancel();
        self.state.children.cancel_all();
    }
}

struct ZipChild<T> {
    index: usize,
    state: Arc<ZipState<T>>,
}

impl<T: Send + 'static> Subscriber<T> for ZipChild<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.state.children.register(self.index, subscription);
    }

    fn on_next(&mut self, value: T) {
        let exhausted = {
            let mut rows = self.state.rows.lock();
            rows.queues[self.index].push_back(value);
            if let Some(row) = rows.next_row() {
                self.state.outlet.offer(row);
            }
            rows.exhausted()
        };
        if exhausted {
            self.state.finish();
        } else {
            self.state.outlet.drain();
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        debug!("zip: source {} failed: {}", self.index, error);
        if self
            .state
            .outlet
            .error(FreshetError::coordinator_failure(self.index, error))
        {
            self.state.children.cancel_all();
        }
    }

    fn on_complete(&mut self) {
        let exhausted = {
            let mut rows = self.state.rows.lock();
            rows.completed[self.index] = true;
            rows.exhausted()
        };
        self.state.children.release(self.index);
        if exhausted {
            self.state.finish();
        }
    }
}

/// Downstream wrapper asking the children for one more value per delivered row.
struct ZipDownstream<T> {
    inner: BoxSubscriber<Vec<T>>,
    state: Weak<ZipState<T>>,
}

impl<T: Send + 'static> Subscriber<Vec<T>> for ZipDownstream<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        self.inner.on_subscribe(subscription);
    }

    fn on_next(&mut self, row: Vec<T>) {
        self.inner.on_next(row);
        if let Some(state) = self.state.upgrade() {
            state.replenish();
        }
    }

    fn on_error(&mut self, error: FreshetError) {
        self.inner.on_error(error);
    }

    fn on_complete(&mut self) {
        self.inner.on_complete();
    }
}

/// One side of a two-source zip, carried through the homogeneous n-ary zip.
pub(crate) enum ZipSlot<A, B> {
    Left(A),
    Right(B),
}

impl<A, B> ZipSlot<A, B> {
    /// Splits a two-element row back into its pair.
    pub(crate) fn into_pair(row: Vec<ZipSlot<A, B>>) -> freshet_core::Result<(A, B)> {
        let mut row = row.into_iter();
        match (row.next(), row.next()) {
            (Some(ZipSlot::Left(a)), Some(ZipSlot::Right(b))) => Ok((a, b)),
            _ => Err(FreshetError::protocol_fault(
                "zip row is not a left/right pair",
            )),
        }
    }
}
