// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{BenchmarkId, Criterion, Throughput};
use freshet_core::{EmptySubscription, FreshetError, Outlet, Subscriber, SubscriptionRef, UNBOUNDED};
use std::hint::black_box;
use std::sync::Arc;
use std::thread;

struct Sink;

impl Subscriber<u64> for Sink {
    fn on_subscribe(&mut self, _subscription: SubscriptionRef) {}

    fn on_next(&mut self, value: u64) {
        black_box(value);
    }

    fn on_error(&mut self, _error: FreshetError) {}

    fn on_complete(&mut self) {}
}

pub fn bench_outlet(c: &mut Criterion) {
    let mut group = c.benchmark_group("outlet");

    for &producers in &[1usize, 2, 4, 8] {
        let items = 10_000u64;
        group.throughput(Throughput::Elements(items * producers as u64));
        let id = BenchmarkId::from_parameter(format!("producers_{producers}"));
        group.bench_with_input(id, &producers, |bencher, &producers| {
            bencher.iter(|| {
                let outlet = Arc::new(Outlet::new());
                outlet.attach(Box::new(Sink), EmptySubscription::shared());
                outlet.request(UNBOUNDED);

                let handles: Vec<_> = (0..producers)
                    .map(|_| {
                        let outlet = Arc::clone(&outlet);
                        thread::spawn(move || {
                            for i in 0..items {
                                outlet.push(i);
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    let _ = handle.join();
                }
                outlet.complete();
            });
        });
    }

    group.finish();
}
