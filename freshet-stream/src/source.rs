// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Synchronous sources backed by a replayable iterator.
//!
//! Every subscription builds a fresh iterator from the publisher's factory, so
//! two runs never share progress. Values are pulled from the iterator only
//! against demand; a drained iterator completes right away, even when nothing
//! was requested.

use freshet_core::mutex::Mutex;
use freshet_core::{
    BoxSubscriber, DemandCounter, FreshetError, Outlet, Publisher, Result, Subscription,
    SubscriptionRef,
};
use std::iter::Peekable;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

type BoxIter<T> = Box<dyn Iterator<Item = Result<T>> + Send>;
type IterFactory<T> = Arc<dyn Fn() -> BoxIter<T> + Send + Sync>;

/// Publisher replaying the items of a fresh iterator for every subscriber.
pub(crate) struct IterPublisher<T> {
    factory: IterFactory<T>,
}

impl<T: Send + 'static> IterPublisher<T> {
    pub(crate) fn new<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: Iterator<Item = Result<T>> + Send + 'static,
    {
        Self {
            factory: Arc::new(move || Box::new(factory()) as BoxIter<T>),
        }
    }
}

impl<T: Send + 'static> Publisher<T> for IterPublisher<T> {
    fn subscribe(&self, mut subscriber: BoxSubscriber<T>) {
        let subscription = Arc::new(IterSubscription {
            wip: AtomicUsize::new(1),
            demand: DemandCounter::new(),
            cancelled: AtomicBool::new(false),
            zero_requested: AtomicBool::new(false),
            run: Mutex::new(IterRun {
                items: (self.factory)().peekable(),
                downstream: None,
            }),
        });

        subscriber.on_subscribe(Arc::clone(&subscription) as SubscriptionRef);
        subscription.run.lock().downstream = Some(subscriber);
        subscription.drain_loop();
    }
}

struct IterRun<T> {
    items: Peekable<BoxIter<T>>,
    downstream: Option<BoxSubscriber<T>>,
}

struct IterSubscription<T> {
    wip: AtomicUsize,
    demand: DemandCounter,
    cancelled: AtomicBool,
    zero_requested: AtomicBool,
    run: Mutex<IterRun<T>>,
}

impl<T: Send + 'static> IterSubscription<T> {
    fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain_loop();
        }
    }

    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            self.emit();
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn emit(&self) {
        let mut run = self.run.lock();
        let IterRun { items, downstream } = &mut *run;
        loop {
            let Some(subscriber) = downstream.as_mut() else {
                return;
            };

            if self.cancelled.load(Ordering::Acquire) {
                *downstream = None;
                return;
            }

            if self.zero_requested.swap(false, Ordering::AcqRel) {
                self.cancelled.store(true, Ordering::Release);
                subscriber.on_error(FreshetError::protocol_fault(
                    "request amount must be positive",
                ));
                *downstream = None;
                return;
            }

            match items.peek() {
                None => {
                    subscriber.on_complete();
                    *downstream = None;
                    return;
                }
                Some(Err(_)) => {
                    if let Some(Err(error)) = items.next() {
                        subscriber.on_error(error);
                    }
                    *downstream = None;
                    return;
                }
                Some(Ok(_)) => {
                    if !self.demand.take_one() {
                        return;
                    }
                    if let Some(Ok(value)) = items.next() {
                        subscriber.on_next(value);
                    }
                }
            }
        }
    }
}

impl<T: Send + 'static> Subscription for IterSubscription<T> {
    fn request(&self, n: u64) {
        if n == 0 {
            self.zero_requested.store(true, Ordering::Release);
        } else {
            self.demand.request(n);
        }
        self.drain();
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.drain();
    }
}

/// Publisher that never signals anything past `on_subscribe`.
pub(crate) struct NeverPublisher;

impl<T: Send + 'static> Publisher<T> for NeverPublisher {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        let outlet = Arc::new(Outlet::new());
        let subscription = Arc::new(NeverSubscription {
            outlet: Arc::clone(&outlet),
        });
        outlet.attach(subscriber, subscription);
    }
}

struct NeverSubscription<T> {
    outlet: Arc<Outlet<T>>,
}

impl<T: Send + 'static> Subscription for NeverSubscription<T> {
    fn request(&self, n: u64) {
        self.outlet.request(n);
    }

    fn cancel(&self) {
        self.outlet.cancel();
    }
}
