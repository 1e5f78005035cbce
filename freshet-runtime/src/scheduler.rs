// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::timer::Timer;
use core::fmt::Debug;
use core::future::Future;
use freshet_core::CancellationToken;
use futures::future::{select, Either};
use futures::pin_mut;

/// Executes detached work and hands out the matching [`Timer`].
///
/// Stages use it for every wait (interval ticks, element delays, time windows)
/// and for `subscribe_on`.
pub trait Scheduler: Clone + Send + Sync + Debug + 'static {
    type Timer: Timer;

    fn timer(&self) -> Self::Timer;

    /// Runs `future` to completion in the background.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Spawns `future` on `scheduler`, dropping it as soon as `token` is cancelled.
///
/// A dropped future never resumes, so cancelled stages are never re-entered by
/// a timer that was still pending.
pub fn spawn_until_cancelled<S, F>(scheduler: &S, token: CancellationToken, future: F)
where
    S: Scheduler,
    F: Future<Output = ()> + Send + 'static,
{
    if token.is_cancelled() {
        return;
    }
    scheduler.spawn(async move {
        let cancelled = token.cancelled();
        pin_mut!(cancelled);
        pin_mut!(future);
        match select(future, cancelled).await {
            Either::Left(((), _)) | Either::Right(((), _)) => {}
        }
    });
}
