// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::sink::drain;
use criterion::{BenchmarkId, Criterion, Throughput};
use freshet_stream::Flux;

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_filter_buffer");

    for &size in &[100u64, 1_000, 10_000] {
        group.throughput(Throughput::Elements(size));
        let pipeline = Flux::<i64>::range(0, size)
            .map(|n| n * 3)
            .filter(|n| n % 2 == 0)
            .buffer(16);
        let id = BenchmarkId::from_parameter(format!("items_{size}"));
        group.bench_with_input(id, &pipeline, |bencher, pipeline| {
            bencher.iter(|| drain(pipeline));
        });
    }

    group.finish();
}
