// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Ready-made [`Subscription`] implementations.

use crate::demand::add_cap;
use crate::mutex::Mutex;
use crate::subscriber::{Subscription, SubscriptionRef};
use alloc::sync::Arc;
use core::mem::take;

/// Subscription of a run that has nothing left to emit.
///
/// Handed out by sources that terminate inside `subscribe` (empty, error) and
/// by stages that finish before their upstream is involved.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySubscription;

impl EmptySubscription {
    /// Shared handle to an empty subscription.
    #[must_use]
    pub fn shared() -> SubscriptionRef {
        Arc::new(Self)
    }
}

impl Subscription for EmptySubscription {
    fn request(&self, _n: u64) {}

    fn cancel(&self) {}
}

#[derive(Default)]
struct DeferredState {
    upstream: Option<SubscriptionRef>,
    requested: u64,
    zero_requested: bool,
    cancelled: bool,
}

/// A subscription handed downstream before the real upstream exists.
///
/// Requests and cancellation issued in the meantime are recorded and replayed
/// once [`set_upstream`](Self::set_upstream) is called. Used where subscribing
/// upstream is postponed: `delay_subscription`, `subscribe_on`, the
/// subscription handles of the exec layer.
#[derive(Default)]
pub struct DeferredSubscription {
    state: Mutex<DeferredState>,
}

impl core::fmt::Debug for DeferredSubscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DeferredSubscription")
            .field("attached", &state.upstream.is_some())
            .field("requested", &state.requested)
            .field("cancelled", &state.cancelled)
            .finish()
    }
}

impl DeferredSubscription {
    /// A subscription with no upstream yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the real upstream and replays what was recorded.
    ///
    /// If the deferred subscription was cancelled, or already has an upstream,
    /// `upstream` is cancelled instead.
    pub fn set_upstream(&self, upstream: SubscriptionRef) {
        let (replay, zero, reject) = {
            let mut state = self.state.lock();
            if state.cancelled || state.upstream.is_some() {
                (0, false, true)
            } else {
                state.upstream = Some(Arc::clone(&upstream));
                (take(&mut state.requested), take(&mut state.zero_requested), false)
            }
        };

        if reject {
            upstream.cancel();
            return;
        }
        if zero {
            upstream.request(0);
        }
        if replay > 0 {
            upstream.request(replay);
        }
    }

    /// Returns `true` once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

impl Subscription for DeferredSubscription {
    fn request(&self, n: u64) {
        let upstream = {
            let mut state = self.state.lock();
            if state.cancelled {
                return;
            }
            match &state.upstream {
                Some(upstream) => Arc::clone(upstream),
                None => {
                    if n == 0 {
                        state.zero_requested = true;
                    } else {
                        state.requested = add_cap(state.requested, n);
                    }
                    return;
                }
            }
        };
        upstream.request(n);
    }

    fn cancel(&self) {
        let upstream = {
            let mut state = self.state.lock();
            state.cancelled = true;
            state.upstream.take()
        };
        if let Some(upstream) = upstream {
            upstream.cancel();
        }
    }
}
