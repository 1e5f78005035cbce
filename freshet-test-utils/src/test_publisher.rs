// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::demand::add_cap;
use freshet_core::mutex::Mutex;
use freshet_core::{BoxSubscriber, FreshetError, Outlet, Publisher, Subscription};
use std::sync::Arc;

/// A publisher driven by hand from the test body.
///
/// Values pushed before anyone subscribed, or before there is demand, are
/// queued and delivered once the subscriber asks for them. Every request and
/// cancel is recorded. Each new subscription replaces the previous one.
pub struct TestPublisher<T> {
    state: Arc<Mutex<TestState<T>>>,
}

struct TestState<T> {
    outlet: Arc<Outlet<T>>,
    requests: Vec<u64>,
    cancelled: bool,
    subscriptions: usize,
}

impl<T> Clone for TestPublisher<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Send + 'static> Default for TestPublisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> TestPublisher<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TestState {
                outlet: Arc::new(Outlet::new()),
                requests: Vec::new(),
                cancelled: false,
                subscriptions: 0,
            })),
        }
    }

    fn outlet(&self) -> Arc<Outlet<T>> {
        Arc::clone(&self.state.lock().outlet)
    }

    pub fn next(&self, value: T) {
        self.outlet().push(value);
    }

    pub fn next_all<I: IntoIterator<Item = T>>(&self, values: I) {
        let outlet = self.outlet();
        for value in values {
            outlet.push(value);
        }
    }

    pub fn complete(&self) {
        self.outlet().complete();
    }

    pub fn error(&self, error: FreshetError) {
        self.outlet().error(error);
    }

    /// Every `request(n)` received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<u64> {
        self.state.lock().requests.clone()
    }

    /// Sum of all requests, saturating at `UNBOUNDED`.
    #[must_use]
    pub fn total_requested(&self) -> u64 {
        self.state.lock().requests.iter().fold(0, |acc, n| add_cap(acc, *n))
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    #[must_use]
    pub fn subscriptions(&self) -> usize {
        self.state.lock().subscriptions
    }
}

impl<T: Send + 'static> Publisher<T> for TestPublisher<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        let outlet = {
            let mut state = self.state.lock();
            state.subscriptions += 1;
            if state.subscriptions > 1 {
                state.outlet = Arc::new(Outlet::new());
            }
            Arc::clone(&state.outlet)
        };
        outlet.attach(
            subscriber,
            Arc::new(TestSubscription {
                state: Arc::clone(&self.state),
                outlet: Arc::clone(&outlet),
            }),
        );
    }
}

struct TestSubscription<T> {
    state: Arc<Mutex<TestState<T>>>,
    outlet: Arc<Outlet<T>>,
}

impl<T: Send + 'static> Subscription for TestSubscription<T> {
    fn request(&self, n: u64) {
        self.state.lock().requests.push(n);
        self.outlet.request(n);
    }

    fn cancel(&self) {
        self.state.lock().cancelled = true;
        self.outlet.cancel();
    }
}
