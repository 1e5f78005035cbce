// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Freshet
//!
//! A reactive stream engine with pull-based backpressure.
//!
//! ## Overview
//!
//! A [`Flux`] is a reusable description of a pipeline that emits zero or more
//! values followed by completion or an error; a [`Mono`] emits at most one.
//! Nothing happens until something subscribes, and every subscription starts
//! its own independent run. Values only move against demand: a subscriber
//! requests `n` items through its [`Subscription`] and the publisher never
//! sends more.
//!
//! The workspace is split by concern:
//!
//! - `freshet-core`: the signal protocol, demand accounting, drain primitives and [`FreshetError`]
//! - `freshet-runtime`: [`Scheduler`] and [`Timer`] over tokio or smol
//! - `freshet-stream`: sources, transforms, reductions, `merge` / `zip` / `first` / `flat_map`
//! - `freshet-time`: `interval`, `delay_elements`, `delay_subscription`, `skip_for`, `take_for`
//! - `freshet-exec`: callback subscriptions and `futures` stream bridges
//!
//! ## Quick Start
//!
//! ```rust
//! use freshet::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let words = Flux::just(["apple", "orange", "banana", "kiwi", "strawberry"])
//!         .filter(|fruit| fruit.len() > 4)
//!         .map(str::to_uppercase)
//!         .buffer(2);
//!
//!     let batches = words.collect_values().await?;
//!     assert_eq!(
//!         batches,
//!         vec![
//!             vec!["APPLE".to_string(), "ORANGE".to_string()],
//!             vec!["BANANA".to_string(), "STRAWBERRY".to_string()],
//!         ]
//!     );
//!     Ok(())
//! }
//! ```

pub use freshet_core::{
    BoxSubscriber, CancellationToken, FreshetError, IntoFreshetError, Publisher, Result, Signal,
    Subscriber, Subscription, SubscriptionRef, UNBOUNDED,
};
pub use freshet_exec::{
    IntoStreamExt, PublisherStream, SubscribeExt, SubscriptionHandle, DEFAULT_PREFETCH,
};
pub use freshet_runtime::{Scheduler, Timer};
pub use freshet_stream::{Flux, Mono};
pub use freshet_time::{
    interval, interval_with_delay, DelayElementsExt, DelaySubscriptionExt, SkipForExt,
    TakeForExt,
};

#[cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))]
pub use freshet_runtime::DefaultScheduler;
#[cfg(feature = "runtime-smol")]
pub use freshet_runtime::SmolScheduler;
#[cfg(feature = "runtime-tokio")]
pub use freshet_runtime::TokioScheduler;

/// Prelude module for convenient imports
pub mod prelude {
    pub use freshet_exec::{IntoStreamExt, SubscribeExt, SubscriptionHandle};
    pub use freshet_stream::prelude::*;
    pub use freshet_time::prelude::*;

    #[cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))]
    pub use freshet_runtime::DefaultScheduler;
    #[cfg(feature = "runtime-smol")]
    pub use freshet_runtime::SmolScheduler;
    #[cfg(feature = "runtime-tokio")]
    pub use freshet_runtime::TokioScheduler;
}
