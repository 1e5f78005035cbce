// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Step-by-step verification of a publisher run.
//!
//! A [`StepVerifier`] subscribes a recording subscriber, then walks an
//! ordered list of expectations and demand actions, awaiting each signal with
//! a timeout. The first mismatch is reported as a [`VerifyError`]. The
//! recorder also checks the protocol itself: a value delivered without demand,
//! or any signal after a terminal one, fails the verification even when the
//! values look right.
//!
//! Waiting uses tokio's clock, so under a paused runtime
//! (`#[tokio::test(start_paused = true)]`) timer-driven pipelines complete in
//! virtual time.
//!
//! ```
//! use freshet_test_utils::{StepVerifier, TestPublisher};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let publisher = TestPublisher::new();
//! publisher.next(1);
//! publisher.next(2);
//! publisher.complete();
//!
//! StepVerifier::create(publisher)
//!     .expect_next(1)
//!     .expect_next(2)
//!     .verify_complete()
//!     .await
//!     .unwrap();
//! # }
//! ```

use freshet_core::{
    DemandCounter, FreshetError, Publisher, Signal, Subscriber, SubscriptionRef,
    UNBOUNDED,
};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

/// Time allowed for each awaited signal unless overridden.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(5);

/// First discrepancy found by a [`StepVerifier`].
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("step {step}: expected {expected}, got {actual}")]
    Mismatch {
        step: usize,
        expected: String,
        actual: String,
    },

    #[error("step {step}: nothing received within {waited:?} while expecting {expected}")]
    Timeout {
        step: usize,
        expected: String,
        waited: Duration,
    },

    #[error("protocol violation: {0}")]
    Violation(String),
}

type Check<T> = Box<dyn Fn(&T) -> bool + Send>;

enum Step<T> {
    Next { description: String, check: Check<T> },
    Count(usize),
    Request(u64),
    Cancel,
}

enum Terminal {
    Complete,
    Error,
    None,
}

enum Event<T> {
    Subscribed(SubscriptionRef),
    Signal(Signal<T>),
    Violation(String),
}

/// Builder of expectations against one run of a publisher.
pub struct StepVerifier<T> {
    publisher: Box<dyn Publisher<T>>,
    initial_request: u64,
    step_timeout: Duration,
    steps: Vec<Step<T>>,
}

impl<T: Debug + Send + 'static> StepVerifier<T> {
    /// Verifies `publisher` with unbounded initial demand.
    pub fn create<P>(publisher: P) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self::create_with_initial_request(publisher, UNBOUNDED)
    }

    /// Verifies `publisher`, requesting only `initial` items up front.
    /// With `0`, nothing is requested until [`then_request`](Self::then_request).
    pub fn create_with_initial_request<P>(publisher: P, initial: u64) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self {
            publisher: Box::new(publisher),
            initial_request: initial,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            steps: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, step_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self
    }

    #[must_use]
    pub fn expect_next(mut self, expected: T) -> Self
    where
        T: PartialEq,
    {
        self.steps.push(Step::Next {
            description: format!("on_next({expected:?})"),
            check: Box::new(move |actual| *actual == expected),
        });
        self
    }

    #[must_use]
    pub fn expect_next_all<I>(self, expected: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: PartialEq,
    {
        expected.into_iter().fold(self, Self::expect_next)
    }

    #[must_use]
    pub fn expect_next_matches<F>(mut self, description: &str, check: F) -> Self
    where
        F: Fn(&T) -> bool + Send + 'static,
    {
        self.steps.push(Step::Next {
            description: format!("on_next matching {description}"),
            check: Box::new(check),
        });
        self
    }

    /// Consumes `count` values without looking at them.
    #[must_use]
    pub fn expect_next_count(mut self, count: usize) -> Self {
        self.steps.push(Step::Count(count));
        self
    }

    #[must_use]
    pub fn then_request(mut self, n: u64) -> Self {
        self.steps.push(Step::Request(n));
        self
    }

    /// Cancels the run. Later steps are not evaluated.
    #[must_use]
    pub fn then_cancel(mut self) -> Self {
        self.steps.push(Step::Cancel);
        self
    }

    /// Runs the steps, then expects `on_complete`.
    pub async fn verify_complete(self) -> Result<(), VerifyError> {
        self.run(Terminal::Complete).await.map(|_| ())
    }

    /// Runs the steps, then expects `on_error` and returns the error.
    pub async fn verify_error(self) -> Result<FreshetError, VerifyError> {
        let step = self.steps.len() + 1;
        match self.run(Terminal::Error).await? {
            Some(error) => Ok(error),
            None => Err(VerifyError::Mismatch {
                step,
                expected: "on_error".to_string(),
                actual: "cancellation".to_string(),
            }),
        }
    }

    /// Runs the steps, then expects an `on_error` whose error satisfies `check`.
    pub async fn verify_error_matches<F>(self, check: F) -> Result<(), VerifyError>
    where
        F: FnOnce(&FreshetError) -> bool,
    {
        let step = self.steps.len() + 1;
        let error = self.verify_error().await?;
        if check(&error) {
            Ok(())
        } else {
            Err(VerifyError::Mismatch {
                step,
                expected: "on_error matching predicate".to_string(),
                actual: format!("on_error({error})"),
            })
        }
    }

    /// Runs the steps without expecting a terminal signal. Meant to end a
    /// script with [`then_cancel`](Self::then_cancel).
    pub async fn verify(self) -> Result<(), VerifyError> {
        self.run(Terminal::None).await.map(|_| ())
    }

    async fn run(self, terminal: Terminal) -> Result<Option<FreshetError>, VerifyError> {
        let (events, mut rx) = unbounded_channel();
        let demand = Arc::new(DemandCounter::new());
        self.publisher.subscribe(Box::new(Recorder {
            events,
            demand: Arc::clone(&demand),
            subscribed: false,
            terminated: false,
        }));

        let mut probe = Probe {
            rx: &mut rx,
            step_timeout: self.step_timeout,
        };

        let subscription = match probe.event(0, "on_subscribe").await? {
            Event::Subscribed(subscription) => subscription,
            Event::Violation(message) => return Err(VerifyError::Violation(message)),
            Event::Signal(signal) => {
                return Err(VerifyError::Violation(format!(
                    "{} before on_subscribe",
                    describe(&signal)
                )))
            }
        };

        if self.initial_request > 0 {
            demand.request(self.initial_request);
            subscription.request(self.initial_request);
        }

        let step = self.steps.len() + 1;
        for (index, scripted) in self.steps.into_iter().enumerate() {
            let step_number = index + 1;
            match scripted {
                Step::Next { description, check } => {
                    let value = probe.value(step_number, &description).await?;
                    if !check(&value) {
                        return Err(VerifyError::Mismatch {
                            step: step_number,
                            expected: description,
                            actual: format!("on_next({value:?})"),
                        });
                    }
                }
                Step::Count(count) => {
                    for _ in 0..count {
                        probe.value(step_number, "on_next").await?;
                    }
                }
                Step::Request(n) => {
                    demand.request(n);
                    subscription.request(n);
                }
                Step::Cancel => {
                    subscription.cancel();
                    return probe.settle().map(|()| None);
                }
            }
        }

        let outcome = match terminal {
            Terminal::None => None,
            Terminal::Complete => match probe.signal(step, "on_complete").await? {
                Signal::Complete => None,
                other => {
                    return Err(VerifyError::Mismatch {
                        step,
                        expected: "on_complete".to_string(),
                        actual: describe(&other),
                    })
                }
            },
            Terminal::Error => match probe.signal(step, "on_error").await? {
                Signal::Error(error) => Some(error),
                other => {
                    return Err(VerifyError::Mismatch {
                        step,
                        expected: "on_error".to_string(),
                        actual: describe(&other),
                    })
                }
            },
        };

        tokio::task::yield_now().await;
        probe.settle()?;
        Ok(outcome)
    }
}

struct Probe<'a, T> {
    rx: &'a mut UnboundedReceiver<Event<T>>,
    step_timeout: Duration,
}

impl<T: Debug> Probe<'_, T> {
    async fn event(&mut self, step: usize, expected: &str) -> Result<Event<T>, VerifyError> {
        match timeout(self.step_timeout, self.rx.recv()).await {
            Ok(Some(event)) => Ok(event),
            Ok(None) => Err(VerifyError::Violation(format!(
                "subscriber dropped while expecting {expected}"
            ))),
            Err(_) => Err(VerifyError::Timeout {
                step,
                expected: expected.to_string(),
                waited: self.step_timeout,
            }),
        }
    }

    async fn signal(&mut self, step: usize, expected: &str) -> Result<Signal<T>, VerifyError> {
        match self.event(step, expected).await? {
            Event::Signal(signal) => Ok(signal),
            Event::Violation(message) => Err(VerifyError::Violation(message)),
            Event::Subscribed(_) => Err(VerifyError::Violation(
                "on_subscribe called twice".to_string(),
            )),
        }
    }

    async fn value(&mut self, step: usize, expected: &str) -> Result<T, VerifyError> {
        match self.signal(step, expected).await? {
            Signal::Next(value) => Ok(value),
            other => Err(VerifyError::Mismatch {
                step,
                expected: expected.to_string(),
                actual: describe(&other),
            }),
        }
    }

    /// Fails on any protocol violation the recorder flagged so far.
    fn settle(&mut self) -> Result<(), VerifyError> {
        while let Ok(event) = self.rx.try_recv() {
            if let Event::Violation(message) = event {
                return Err(VerifyError::Violation(message));
            }
        }
        Ok(())
    }
}

fn describe<T: Debug>(signal: &Signal<T>) -> String {
    match signal {
        Signal::Next(value) => format!("on_next({value:?})"),
        Signal::Error(error) => format!("on_error({error})"),
        Signal::Complete => "on_complete".to_string(),
    }
}

struct Recorder<T> {
    events: UnboundedSender<Event<T>>,
    demand: Arc<DemandCounter>,
    subscribed: bool,
    terminated: bool,
}

impl<T> Recorder<T> {
    fn violation(&self, message: &str) {
        let _ = self.events.send(Event::Violation(message.to_string()));
    }
}

impl<T: Send + 'static> Subscriber<T> for Recorder<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        if self.subscribed {
            self.violation("on_subscribe called twice");
            return;
        }
        self.subscribed = true;
        let _ = self.events.send(Event::Subscribed(subscription));
    }

    fn on_next(&mut self, value: T) {
        if self.terminated {
            self.violation("on_next after a terminal signal");
            return;
        }
        if !self.demand.take_one() {
            self.violation("on_next without outstanding demand");
            return;
        }
        let _ = self.events.send(Event::Signal(Signal::Next(value)));
    }

    fn on_error(&mut self, error: FreshetError) {
        if self.terminated {
            self.violation("on_error after a terminal signal");
            return;
        }
        self.terminated = true;
        let _ = self.events.send(Event::Signal(Signal::Error(error)));
    }

    fn on_complete(&mut self) {
        if self.terminated {
            self.violation("on_complete after a terminal signal");
            return;
        }
        self.terminated = true;
        let _ = self.events.send(Event::Signal(Signal::Complete));
    }
}
