// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::aggregate::{AggregatePublisher, All, Any, CollectList, CollectMap};
use crate::buffer::BufferPublisher;
use crate::filter::FilterPublisher;
use crate::first::FirstPublisher;
use crate::flat_map::FlatMapPublisher;
use crate::log::LogPublisher;
use crate::map::MapPublisher;
use crate::merge::MergePublisher;
use crate::mono::Mono;
use crate::source::{IterPublisher, NeverPublisher};
use crate::subscribe_on::SubscribeOnPublisher;
use crate::take::TakePublisher;
use crate::zip::{ZipPublisher, ZipSlot};
use freshet_core::{BoxSubscriber, FreshetError, IntoFreshetError, Publisher};
use freshet_runtime::Scheduler;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

/// A publisher of zero or more values, with every operator available as a
/// method.
///
/// `Flux` is a cheap, cloneable handle to an immutable pipeline definition.
/// Operators never mutate it; they return a new `Flux` wrapping the old one.
/// Nothing runs until [`subscribe`](Publisher::subscribe) is called, and every
/// subscription is an independent run with its own per-stage state.
///
/// # Example
///
/// ```
/// use freshet_stream::Flux;
///
/// let evens = Flux::range(1, 10).filter(|n| n % 2 == 0).map(|n| n * 10);
/// let firsts = evens.take(2);
/// # let _ = firsts;
/// ```
pub struct Flux<T> {
    publisher: Arc<dyn Publisher<T>>,
}

impl<T> Clone for Flux<T> {
    fn clone(&self) -> Self {
        Self {
            publisher: Arc::clone(&self.publisher),
        }
    }
}

impl<T> Debug for Flux<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flux").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Publisher<T> for Flux<T> {
    fn subscribe(&self, subscriber: BoxSubscriber<T>) {
        self.publisher.subscribe(subscriber);
    }
}

impl<T: Send + 'static> From<Mono<T>> for Flux<T> {
    fn from(mono: Mono<T>) -> Self {
        mono.into_flux()
    }
}

// Sources
impl<T: Send + 'static> Flux<T> {
    /// Wraps any publisher.
    pub fn from_publisher<P>(publisher: P) -> Self
    where
        P: Publisher<T> + 'static,
    {
        Self {
            publisher: Arc::new(publisher),
        }
    }

    /// Emits the given values in order, then completes.
    pub fn just<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        Self::from_vec(values.into_iter().collect())
    }

    pub fn from_array<const N: usize>(values: [T; N]) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_vec(Vec::from(values))
    }

    pub fn from_vec(values: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        let values = Arc::new(values);
        Self::from_publisher(IterPublisher::new(move || {
            let values = Arc::clone(&values);
            (0..values.len()).map(move |i| Ok(values[i].clone()))
        }))
    }

    /// Replays `items` for every subscriber.
    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
    {
        Self::from_publisher(IterPublisher::new(move || {
            items.clone().into_iter().map(Ok)
        }))
    }

    /// Emits the `Ok` items in order; the first `Err` terminates the run with a
    /// [`FreshetError::SourceFailure`].
    pub fn try_from_iter<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = Result<T, E>> + Clone + Send + Sync + 'static,
        I::IntoIter: Send + 'static,
        E: Display,
    {
        Self::from_publisher(IterPublisher::new(move || {
            items
                .clone()
                .into_iter()
                .map(|item| item.map_err(|e| FreshetError::source_failure(e.to_string())))
        }))
    }

    /// Completes immediately without emitting.
    pub fn empty() -> Self {
        Self::from_publisher(IterPublisher::new(std::iter::empty))
    }

    /// Fails immediately with `error`.
    pub fn error(error: FreshetError) -> Self {
        Self::from_publisher(IterPublisher::new(move || std::iter::once(Err(error.clone()))))
    }

    /// Never emits and never terminates.
    pub fn never() -> Self {
        Self::from_publisher(NeverPublisher)
    }

    /// Interleaves all `sources` in arrival order.
    pub fn merge(sources: Vec<Flux<T>>) -> Self {
        Self::from_publisher(MergePublisher::new(sources))
    }

    /// Index-aligned rows, one value from each source per row. Completes with
    /// the shortest source.
    pub fn zip(sources: Vec<Flux<T>>) -> Flux<Vec<T>> {
        Flux::from_publisher(ZipPublisher::new(sources))
    }

    /// Mirrors whichever source signals first and cancels the others.
    pub fn first(sources: Vec<Flux<T>>) -> Self {
        Self::from_publisher(FirstPublisher::new(sources))
    }
}

impl Flux<i64> {
    /// Emits `start, start + 1, …` for `count` values, then completes.
    pub fn range(start: i64, count: u64) -> Self {
        Self::from_publisher(IterPublisher::new(move || {
            (0..count).map_while(move |offset| {
                i64::try_from(offset)
                    .ok()
                    .and_then(|offset| start.checked_add(offset))
                    .map(Ok)
            })
        }))
    }
}

// Operators
impl<T: Send + 'static> Flux<T> {
    pub fn map<U, F>(&self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Flux::from_publisher(MapPublisher::new(self.clone(), move |value| Ok(f(value))))
    }

    /// Like [`map`](Self::map), but an `Err` terminates the run with a
    /// [`FreshetError::TransformFailure`] and cancels the upstream.
    pub fn try_map<U, E, F>(&self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        E: IntoFreshetError,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    {
        Flux::from_publisher(MapPublisher::new(self.clone(), move |value| {
            f(value).map_err(IntoFreshetError::into_freshet)
        }))
    }

    /// Runs `f` on every value before passing it on.
    pub fn do_on_next<F>(&self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Flux::from_publisher(MapPublisher::new(self.clone(), move |value| {
            f(&value);
            Ok(value)
        }))
    }

    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_publisher(FilterPublisher::predicate(self.clone(), predicate))
    }

    /// Drops values already seen in this run.
    pub fn distinct(&self) -> Self
    where
        T: Eq + Hash + Clone,
    {
        self.distinct_by(T::clone)
    }

    /// Drops values whose key was already seen in this run.
    pub fn distinct_by<K, F>(&self, key: F) -> Self
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self::from_publisher(FilterPublisher::distinct_by(self.clone(), key))
    }

    pub fn skip(&self, count: usize) -> Self {
        Self::from_publisher(FilterPublisher::skip(self.clone(), count))
    }

    /// Emits at most `count` values, then completes and cancels the upstream.
    pub fn take(&self, count: u64) -> Self {
        Self::from_publisher(TakePublisher::new(self.clone(), count))
    }

    /// Groups values into windows of `size`; a shorter final window is emitted
    /// before completion.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn buffer(&self, size: usize) -> Flux<Vec<T>> {
        Flux::from_publisher(BufferPublisher::new(self.clone(), size))
    }

    pub fn collect_list(&self) -> Mono<Vec<T>> {
        Mono::from_publisher(AggregatePublisher::new(self.clone(), || {
            CollectList(Vec::new())
        }))
    }

    /// Collects into a map keyed by `key`. A later value replaces an earlier
    /// one with the same key.
    pub fn collect_map<K, F>(&self, key: F) -> Mono<HashMap<K, T>>
    where
        K: Eq + Hash + Send + 'static,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.collect_map_with(key, |value| value)
    }

    pub fn collect_map_with<K, V, KF, VF>(&self, key: KF, value: VF) -> Mono<HashMap<K, V>>
    where
        K: Eq + Hash + Send + 'static,
        V: Send + 'static,
        KF: Fn(&T) -> K + Send + Sync + 'static,
        VF: Fn(T) -> V + Send + Sync + 'static,
    {
        let project: crate::aggregate::Projection<T, K, V> = Arc::new(move |item: T| {
            let k = key(&item);
            (k, value(item))
        });
        Mono::from_publisher(AggregatePublisher::new(self.clone(), move || CollectMap {
            entries: HashMap::new(),
            project: Arc::clone(&project),
        }))
    }

    /// `true` unless some value fails `predicate`. Stops at the first failure.
    pub fn all<P>(&self, predicate: P) -> Mono<bool>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: crate::aggregate::Predicate<T> = Arc::new(predicate);
        Mono::from_publisher(AggregatePublisher::new(self.clone(), move || {
            All(Arc::clone(&predicate))
        }))
    }

    /// `true` as soon as some value matches `predicate`.
    pub fn any<P>(&self, predicate: P) -> Mono<bool>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: crate::aggregate::Predicate<T> = Arc::new(predicate);
        Mono::from_publisher(AggregatePublisher::new(self.clone(), move || {
            Any(Arc::clone(&predicate))
        }))
    }

    pub fn merge_with(&self, other: Flux<T>) -> Self {
        Self::merge(vec![self.clone(), other])
    }

    pub fn first_with(&self, other: Flux<T>) -> Self {
        Self::first(vec![self.clone(), other])
    }

    /// Pairs values of `self` and `other` by index.
    pub fn zip_with<U>(&self, other: Flux<U>) -> Flux<(T, U)>
    where
        U: Send + 'static,
    {
        let left = self.map(ZipSlot::Left);
        let right = other.map(ZipSlot::Right);
        Flux::from_publisher(ZipPublisher::new(vec![left, right]))
            .try_map_signal(ZipSlot::into_pair)
    }

    /// Combines values of `self` and `other` pairwise with `combiner`.
    pub fn zip_with_combiner<U, R, F>(&self, other: Flux<U>, combiner: F) -> Flux<R>
    where
        U: Send + 'static,
        R: Send + 'static,
        F: Fn(T, U) -> R + Send + Sync + 'static,
    {
        self.zip_with(other).map(move |(a, b)| combiner(a, b))
    }

    /// Maps every value to an inner publisher and interleaves their values.
    pub fn flat_map<U, F>(&self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        Flux::from_publisher(FlatMapPublisher::new(self.clone(), f, None))
    }

    /// [`flat_map`](Self::flat_map) with at most `concurrency` inner
    /// publishers subscribed at a time.
    ///
    /// # Panics
    ///
    /// Panics if `concurrency` is zero.
    pub fn flat_map_with_concurrency<U, F>(&self, f: F, concurrency: usize) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Flux<U> + Send + Sync + 'static,
    {
        Flux::from_publisher(FlatMapPublisher::new(self.clone(), f, Some(concurrency)))
    }

    /// Subscribes to this pipeline from a task spawned on `scheduler`.
    pub fn subscribe_on<S: Scheduler>(&self, scheduler: S) -> Self {
        Self::from_publisher(SubscribeOnPublisher::new(
            Arc::clone(&self.publisher),
            scheduler,
        ))
    }

    /// Logs every signal, request and cancel under `category`.
    pub fn log(&self, category: &str) -> Self
    where
        T: Debug,
    {
        Self::from_publisher(LogPublisher::new(self.clone(), category))
    }

    fn try_map_signal<U, F>(&self, f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: Fn(T) -> freshet_core::Result<U> + Send + Sync + 'static,
    {
        Flux::from_publisher(MapPublisher::new(self.clone(), f))
    }
}
