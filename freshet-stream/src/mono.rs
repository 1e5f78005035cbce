// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::flux::Flux;
use crate::map::MapPublisher;
use crate::source::IterPublisher;
use crate::subscribe_on::SubscribeOnPublisher;
use freshet_core::{BoxSubscriber, FreshetError, Publisher};
use freshet_runtime::Scheduler;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A publisher of at most one value.
///
/// Returned by the reductions of [`Flux`] (`collect_list`, `all`, …) and
/// usable wherever a one-element `Flux` is expected, in particular as the
/// inner publisher of [`Flux::flat_map`].
pub struct Mono<T> {
    publisher: Arc<dyn Publisher<T>>,
}

impl<T> Clone for Mono<T> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<T> Debug for Mono<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mono").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Publisher<T> for Mono<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        self.publisher.subscribe(subscriber);
    }
}

impl<T: Send + 'static> Mono<T> {
    pub(crate) fn from_publisher<P>(publisher: P) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self {
            publisher: Arc::new(publisher),
        }
    }

    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_publisher(IterPublisher::new(move || std::iter::once(Ok(value.clone()))))
    }

    pub fn empty() -> Self {
        Self::from_publisher(IterPublisher::new(std::iter::empty))
    }

    pub fn error(error: FreshetError) -> Self {
        Self::from_publisher(IterPublisher::new(move || std::iter::once(Err(error.clone()))))
    }

    pub fn map<U, F>(&self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Mono::from_publisher(MapPublisher::new(self.clone().into_flux(), move |value| {
            Ok(f(value))
        }))
    }

    pub fn subscribe_on<S: Scheduler>(&self, scheduler: S) -> Self {
        Self::from_publisher(SubscribeOnPublisher::new(
            Arc::clone(&self.publisher),
            scheduler,
        ))
    }

    pub fn into_flux(self) -> Flux<T> {
        Flux::from_publisher(self)
    }
}
