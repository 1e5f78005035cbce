// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::mutex::Mutex;
use freshet_core::{ChildArena, DeferredSubscription, Subscription, UNBOUNDED};
use std::sync::Arc;

#[derive(Default)]
struct Probe {
    requests: Mutex<Vec<u64>>,
    cancelled: Mutex<bool>,
}

impl Subscription for Probe {
    fn request(&self, n: u64) {
        self.requests.lock().push(n);
    }

    fn cancel(&self) {
        *self.cancelled.lock() = true;
    }
}

#[test]
fn test_late_child_receives_outstanding_demand() {
    let arena = ChildArena::with_children(2);
    let first = Arc::new(Probe::default());
    let second = Arc::new(Probe::default());

    arena.register(0, first.clone());
    arena.request_all(3);
    arena.register(1, second.clone());
    arena.request_all(2);

    assert_eq!(*first.requests.lock(), vec![3, 2]);
    assert_eq!(*second.requests.lock(), vec![3, 2]);
}

#[test]
fn test_cancel_all_reaches_registered_and_late_children() {
    let arena = ChildArena::with_children(2);
    let first = Arc::new(Probe::default());
    let late = Arc::new(Probe::default());

    arena.register(0, first.clone());
    arena.cancel_all();
    arena.register(1, late.clone());
    arena.request_all(UNBOUNDED);

    assert!(*first.cancelled.lock());
    assert!(*late.cancelled.lock());
    assert!(late.requests.lock().is_empty());
    assert!(arena.is_cancelled());
}

#[test]
fn test_cancel_others_keeps_the_winner() {
    let arena = ChildArena::with_children(3);
    let probes: Vec<_> = (0..2).map(|_| Arc::new(Probe::default())).collect();
    arena.register(0, probes[0].clone());
    arena.register(1, probes[1].clone());

    arena.cancel_others(1);
    let late = Arc::new(Probe::default());
    arena.register(2, late.clone());

    assert!(*probes[0].cancelled.lock());
    assert!(!*probes[1].cancelled.lock());
    assert!(*late.cancelled.lock());
    assert_eq!(arena.active(), 1);
}

#[test]
fn test_released_slots_are_reused() {
    let arena = ChildArena::new();
    let a = arena.reserve();
    let b = arena.reserve();
    arena.register(a, Arc::new(Probe::default()));
    arena.register(b, Arc::new(Probe::default()));

    arena.release(a);

    assert_eq!(arena.reserve(), a);
    assert_eq!(arena.active(), 1);
}

#[test]
fn test_deferred_subscription_replays_demand() {
    let deferred = DeferredSubscription::new();
    deferred.request(2);
    deferred.request(5);

    let upstream = Arc::new(Probe::default());
    deferred.set_upstream(upstream.clone());
    deferred.request(1);

    assert_eq!(*upstream.requests.lock(), vec![7, 1]);
}

#[test]
fn test_deferred_subscription_replays_cancel() {
    let deferred = DeferredSubscription::new();
    deferred.request(2);
    deferred.cancel();

    let upstream = Arc::new(Probe::default());
    deferred.set_upstream(upstream.clone());

    assert!(deferred.is_cancelled());
    assert!(*upstream.cancelled.lock());
    assert!(upstream.requests.lock().is_empty());
}

#[test]
fn test_deferred_subscription_rejects_second_upstream() {
    let deferred = DeferredSubscription::new();
    let first = Arc::new(Probe::default());
    let second = Arc::new(Probe::default());

    deferred.set_upstream(first.clone());
    deferred.set_upstream(second.clone());

    assert!(!*first.cancelled.lock());
    assert!(*second.cancelled.lock());
}

#[test]
fn test_request_reaches_only_the_named_child() {
    let arena = ChildArena::with_children(3);
    let probes: Vec<_> = (0..3).map(|_| Arc::new(Probe::default())).collect();
    for (index, probe) in probes.iter().enumerate() {
        arena.register(index, probe.clone());
    }

    arena.request(1, 4);
    arena.release(2);
    arena.request(2, 1);

    assert!(probes[0].requests.lock().is_empty());
    assert_eq!(*probes[1].requests.lock(), vec![4]);
    assert!(probes[2].requests.lock().is_empty());
}

#[test]
fn test_request_after_cancel_all_is_ignored() {
    let arena = ChildArena::with_children(1);
    let child = Arc::new(Probe::default());
    arena.register(0, child.clone());

    arena.cancel_all();
    arena.request(0, 8);

    assert!(child.requests.lock().is_empty());
}

#[test]
fn test_deferred_subscription_debug_reports_state() {
    let deferred = DeferredSubscription::new();
    deferred.request(5);

    let pending = format!("{deferred:?}");
    deferred.set_upstream(Arc::new(Probe::default()));
    let attached = format!("{deferred:?}");

    assert!(pending.contains("attached: false"));
    assert!(pending.contains("requested: 5"));
    assert!(attached.contains("attached: true"));
}
