// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::outlet_bench::bench_outlet;
use criterion::{criterion_group, criterion_main};

mod outlet_bench;

criterion_group!(benches, bench_outlet);
criterion_main!(benches);
