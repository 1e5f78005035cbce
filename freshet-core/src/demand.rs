// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Lock-free demand bookkeeping.
//!
//! Demand is an unsigned count of items a subscriber is willing to receive.
//! [`UNBOUNDED`] is a sentinel: once reached it is never decremented and
//! further additions are absorbed.

use core::sync::atomic::{AtomicU64, Ordering};

/// Demand value meaning "emit as fast as you like".
pub const UNBOUNDED: u64 = u64::MAX;

/// Adds two demand amounts, saturating at [`UNBOUNDED`].
#[must_use]
pub const fn add_cap(a: u64, b: u64) -> u64 {
    a.saturating_add(b)
}

/// Multiplies a demand amount, saturating at [`UNBOUNDED`].
#[must_use]
pub const fn multiply_cap(a: u64, b: u64) -> u64 {
    a.saturating_mul(b)
}

/// Atomic demand counter shared between a subscription and its emitter.
#[derive(Debug, Default)]
pub struct DemandCounter {
    value: AtomicU64,
}

impl DemandCounter {
    /// A counter with no outstanding demand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Adds `n` to the outstanding demand and returns the previous value.
    pub fn request(&self, n: u64) -> u64 {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            if current == UNBOUNDED {
                return UNBOUNDED;
            }
            let next = add_cap(current, n);
            match self
                .value
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(previous) => return previous,
                Err(actual) => current = actual,
            }
        }
    }

    /// Consumes one unit of demand. Returns `false` when there is none.
    pub fn take_one(&self) -> bool {
        let mut current = self.value.load(Ordering::Acquire);
        loop {
            match current {
                UNBOUNDED => return true,
                0 => return false,
                n => match self.value.compare_exchange_weak(
                    current,
                    n - 1,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return true,
                    Err(actual) => current = actual,
                },
            }
        }
    }

    /// Current outstanding demand.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    /// Returns `true` if at least one item may be emitted.
    pub fn has_demand(&self) -> bool {
        self.current() > 0
    }

    /// Returns `true` once the demand has become unbounded.
    pub fn is_unbounded(&self) -> bool {
        self.current() == UNBOUNDED
    }
}
