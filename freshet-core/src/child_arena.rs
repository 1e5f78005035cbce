// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Child-subscription bookkeeping for fan-out stages.
//!
//! Merge, zip, first and flat_map subscribe to several upstreams at once. Their
//! upstream subscriptions live in a [`ChildArena`], indexed by source position,
//! so that demand can be broadcast and every still-active child can be torn
//! down explicitly when the parent terminates or is cancelled.
//!
//! Handles are always cloned out of the lock before `request`/`cancel` is
//! called on them: a synchronous child may emit (and re-enter the parent) from
//! inside `request`.

use crate::demand::add_cap;
use crate::mutex::Mutex;
use crate::subscriber::SubscriptionRef;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem::replace;

#[derive(Default)]
enum Slot {
    #[default]
    Free,
    Reserved,
    Active(SubscriptionRef),
}

#[derive(Default)]
struct ArenaState {
    slots: Vec<Slot>,
    requested: u64,
    cancelled: bool,
}

enum Admission {
    Request(u64),
    Idle,
    Reject,
}

/// Arena of child subscriptions with broadcast demand and explicit teardown.
#[derive(Default)]
pub struct ChildArena {
    state: Mutex<ArenaState>,
}

impl ChildArena {
    /// An arena that grows on demand through [`reserve`](Self::reserve).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An arena with `count` slots reserved for children `0..count`.
    #[must_use]
    pub fn with_children(count: usize) -> Self {
        let mut slots = Vec::with_capacity(count);
        slots.resize_with(count, || Slot::Reserved);
        Self {
            state: Mutex::new(ArenaState {
                slots,
                requested: 0,
                cancelled: false,
            }),
        }
    }

    /// Reserves a slot for a child about to be subscribed and returns its
    /// index. Free slots are reused.
    pub fn reserve(&self) -> usize {
        let mut state = self.state.lock();
        if let Some(index) = state.slots.iter().position(|s| matches!(s, Slot::Free)) {
            state.slots[index] = Slot::Reserved;
            return index;
        }
        state.slots.push(Slot::Reserved);
        state.slots.len() - 1
    }

    /// Records the subscription of child `index` and grants it the demand
    /// broadcast so far. If the arena was shut down the child is cancelled.
    pub fn register(&self, index: usize, subscription: SubscriptionRef) {
        let admission = {
            let mut state = self.state.lock();
            let reserved = matches!(state.slots.get(index), Some(Slot::Reserved));
            if state.cancelled || !reserved {
                Admission::Reject
            } else {
                state.slots[index] = Slot::Active(Arc::clone(&subscription));
                match state.requested {
                    0 => Admission::Idle,
                    n => Admission::Request(n),
                }
            }
        };

        match admission {
            Admission::Request(n) => subscription.request(n),
            Admission::Reject => subscription.cancel(),
            Admission::Idle => {}
        }
    }

    /// Broadcasts `n` more demand to every active child and remembers it for
    /// children registered later.
    pub fn request_all(&self, n: u64) {
        let children: Vec<SubscriptionRef> = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            state.requested = add_cap(state.requested, n);
            state
                .slots
                .iter()
                .filter_map(|slot| match slot {
                    Slot::Active(subscription) => Some(Arc::clone(subscription)),
                    _ => None,
                })
                .collect()
        };

        for child in children {
            child.request(n);
        }
    }

    /// Grants `n` more demand to child `index` alone. Children that are not
    /// registered, or an arena that was shut down, ignore the request.
    pub fn request(&self, index: usize, n: u64) {
        let child = {
            let state = self.state.lock();
            if state.cancelled {
                return;
            }
            match state.slots.get(index) {
                Some(Slot::Active(subscription)) => Arc::clone(subscription),
                _ => return,
            }
        };
        child.request(n);
    }

    /// Forgets child `index` after it terminated on its own.
    pub fn release(&self, index: usize) {
        let mut state = self.state.lock();
        if let Some(slot) = state.slots.get_mut(index) {
            *slot = Slot::Free;
        }
    }

    /// Cancels every child and refuses children registered later.
    pub fn cancel_all(&self) {
        let children = {
            let mut state = self.state.lock();
            state.cancelled = true;
            Self::take_active(&mut state, None)
        };
        for child in children {
            child.cancel();
        }
    }

    /// Cancels every child except `keep`, which stays registered.
    pub fn cancel_others(&self, keep: usize) {
        let children = {
            let mut state = self.state.lock();
            Self::take_active(&mut state, Some(keep))
        };
        for child in children {
            child.cancel();
        }
    }

    /// Returns `true` once [`cancel_all`](Self::cancel_all) was called.
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Number of children currently registered.
    pub fn active(&self) -> usize {
        self.state
            .lock()
            .slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Active(_)))
            .count()
    }

    fn take_active(state: &mut ArenaState, keep: Option<usize>) -> Vec<SubscriptionRef> {
        let mut taken = Vec::new();
        for (index, slot) in state.slots.iter_mut().enumerate() {
            if Some(index) == keep {
                continue;
            }
            // A freed reservation makes the late child's register() cancel it.
            if let Slot::Active(subscription) = replace(slot, Slot::Free) {
                taken.push(subscription);
            }
        }
        taken
    }
}
