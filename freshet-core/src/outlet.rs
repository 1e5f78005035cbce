// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serialized, demand-respecting delivery to one downstream subscriber.
//!
//! Stages fed from several threads at once (merge, zip, flat_map, timers) do not
//! call their downstream directly. They hand values and terminal signals to an
//! [`Outlet`], which queues them and delivers from a single drain loop:
//!
//! - whoever increments the work-in-progress counter from zero owns the loop;
//!   everybody else only records that more work is pending and returns;
//! - a value leaves the queue only against outstanding demand;
//! - an error discards queued values and is delivered immediately, completion
//!   waits until the queue is empty;
//! - `request`, `push` and `cancel` never lock the downstream, so they can be
//!   called from inside the downstream's own handlers without deadlocking.

use crate::demand::DemandCounter;
use crate::error::FreshetError;
use crate::mutex::Mutex;
use crate::subscriber::{BoxSubscriber, SubscriptionRef};
use alloc::collections::VecDeque;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

struct Pending<T> {
    queue: VecDeque<T>,
    error: Option<FreshetError>,
    complete: bool,
    terminated: bool,
}

enum Step<T> {
    Next(T),
    Error(FreshetError),
    Complete,
    Idle,
}

/// Queue-drain emitter owning one downstream subscriber.
///
/// [`attach`](Outlet::attach) must be called exactly once; until then every
/// signal is only queued.
pub struct Outlet<T> {
    wip: AtomicUsize,
    demand: DemandCounter,
    cancelled: AtomicBool,
    pending: Mutex<Pending<T>>,
    downstream: Mutex<Option<BoxSubscriber<T>>>,
}

impl<T: Send + 'static> Default for Outlet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Outlet<T> {
    /// Creates an outlet whose drain is held until `attach`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wip: AtomicUsize::new(1),
            demand: DemandCounter::new(),
            cancelled: AtomicBool::new(false),
            pending: Mutex::new(Pending {
                queue: VecDeque::new(),
                error: None,
                complete: false,
                terminated: false,
            }),
            downstream: Mutex::new(None),
        }
    }

    /// Hands `subscription` to `downstream`, installs it and flushes whatever
    /// was queued in the meantime.
    pub fn attach(&self, mut downstream: BoxSubscriber<T>, subscription: SubscriptionRef) {
        downstream.on_subscribe(subscription);
        *self.downstream.lock() = Some(downstream);
        self.drain_loop();
    }

    /// Adds downstream demand.
    ///
    /// Returns `false` for `n == 0`: the outlet then terminates with a protocol
    /// fault and the caller must tear down its upstreams.
    pub fn request(&self, n: u64) -> bool {
        if n == 0 {
            self.error(FreshetError::protocol_fault(
                "request amount must be positive",
            ));
            return false;
        }
        self.demand.request(n);
        self.drain();
        true
    }

    /// Queues a value and delivers it if there is demand.
    pub fn push(&self, value: T) {
        if self.offer(value) {
            self.drain();
        }
    }

    /// Queues a value without draining. Returns `false` if the outlet no
    /// longer accepts values. Callers must call [`drain`](Self::drain) later.
    pub fn offer(&self, value: T) -> bool {
        if self.cancelled.load(Ordering::Acquire) {
            return false;
        }
        let mut pending = self.pending.lock();
        if pending.terminated {
            return false;
        }
        pending.queue.push_back(value);
        true
    }

    /// Completes once every queued value has been delivered.
    pub fn complete(&self) {
        {
            let mut pending = self.pending.lock();
            if pending.terminated {
                return;
            }
            pending.terminated = true;
            pending.complete = true;
        }
        self.drain();
    }

    /// Drops queued values and delivers `error`. Returns `false` if the outlet
    /// had already terminated, in which case `error` is discarded.
    pub fn error(&self, error: FreshetError) -> bool {
        {
            let mut pending = self.pending.lock();
            if pending.terminated {
                return false;
            }
            pending.terminated = true;
            pending.queue.clear();
            pending.error = Some(error);
        }
        self.drain();
        true
    }

    /// Stops delivery and releases the downstream.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.drain();
    }

    /// Returns `true` once cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns `true` once a terminal signal was accepted or the outlet was
    /// cancelled.
    pub fn is_terminated(&self) -> bool {
        self.is_cancelled() || self.pending.lock().terminated
    }

    /// Runs the drain loop unless another thread is already running it.
    pub fn drain(&self) {
        if self.wip.fetch_add(1, Ordering::AcqRel) == 0 {
            self.drain_loop();
        }
    }

    fn drain_loop(&self) {
        let mut missed = 1;
        loop {
            self.deliver();
            missed = self.wip.fetch_sub(missed, Ordering::AcqRel) - missed;
            if missed == 0 {
                break;
            }
        }
    }

    fn next_step(&self) -> Step<T> {
        let mut pending = self.pending.lock();
        if let Some(error) = pending.error.take() {
            return Step::Error(error);
        }
        if pending.queue.is_empty() {
            if pending.complete {
                pending.complete = false;
                return Step::Complete;
            }
            return Step::Idle;
        }
        if self.demand.take_one() {
            return pending.queue.pop_front().map_or(Step::Idle, Step::Next);
        }
        Step::Idle
    }

    fn deliver(&self) {
        let mut slot = self.downstream.lock();
        loop {
            let Some(downstream) = slot.as_mut() else {
                return;
            };

            if self.cancelled.load(Ordering::Acquire) {
                *slot = None;
                let mut pending = self.pending.lock();
                pending.queue.clear();
                pending.terminated = true;
                return;
            }

            match self.next_step() {
                Step::Next(value) => downstream.on_next(value),
                Step::Error(error) => {
                    if let Some(mut downstream) = slot.take() {
                        downstream.on_error(error);
                    }
                    return;
                }
                Step::Complete => {
                    if let Some(mut downstream) = slot.take() {
                        downstream.on_complete();
                    }
                    return;
                }
                Step::Idle => return,
            }
        }
    }
}
