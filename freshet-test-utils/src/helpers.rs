// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::{FreshetError, Publisher, Signal, Subscriber, SubscriptionRef, UNBOUNDED};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::time::timeout;

struct SignalSink<T> {
    events: UnboundedSender<Signal<T>>,
}

impl<T: Send + 'static> Subscriber<T> for SignalSink<T> {
    fn on_subscribe(&mut self, subscription: SubscriptionRef) {
        subscription.request(UNBOUNDED);
    }

    fn on_next(&mut self, value: T) {
        let _ = self.events.send(Signal::Next(value));
    }

    fn on_error(&mut self, error: FreshetError) {
        let _ = self.events.send(Signal::Error(error));
    }

    fn on_complete(&mut self) {
        let _ = self.events.send(Signal::Complete);
    }
}

/// Subscribes with unbounded demand and gathers signals until a terminal one
/// arrives or nothing shows up for `idle`.
pub async fn record_signals<T, P>(publisher: &P, idle: Duration) -> Vec<Signal<T>>
where
    T: Send + 'static,
    P: Publisher<T>,
{
    let (events, mut rx) = unbounded_channel();
    publisher.subscribe(Box::new(SignalSink { events }));

    let mut signals = Vec::new();
    while let Ok(Some(signal)) = timeout(idle, rx.recv()).await {
        let terminal = signal.is_terminal();
        signals.push(signal);
        if terminal {
            break;
        }
    }
    signals
}
