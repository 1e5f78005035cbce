// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mutex used for all per-run stage state. Never poisoned, never reentrant.

pub use parking_lot::{Mutex, MutexGuard};
