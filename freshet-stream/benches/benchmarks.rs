// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::merge_bench::bench_merge;
use crate::pipeline_bench::bench_pipeline;
use criterion::{criterion_group, criterion_main};

mod pipeline_bench;

criterion_group!(benches, bench_pipeline, bench_merge);
criterion_main!(benches);
