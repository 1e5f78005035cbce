// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Signal protocol and concurrency building blocks of the Freshet engine.
//!
//! - [`Publisher`], [`Subscriber`], [`Subscription`]: the three protocol roles
//! - [`Signal`]: next / error / complete
//! - [`DemandCounter`]: atomic backpressure bookkeeping
//! - [`Outlet`]: serialized queue-drain delivery for multi-threaded stages
//! - [`ChildArena`]: child subscriptions of fan-out stages
//! - [`DeferredSubscription`]: demand recorded before the upstream exists
//! - [`FreshetError`]: the error taxonomy

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

extern crate alloc;

pub mod cancellation_token;
pub mod child_arena;
pub mod demand;
pub mod error;
pub mod mutex;
pub mod outlet;
pub mod signal;
pub mod subscriber;
pub mod subscription;

pub use self::cancellation_token::CancellationToken;
pub use self::child_arena::ChildArena;
pub use self::demand::{DemandCounter, UNBOUNDED};
pub use self::error::{FreshetError, IntoFreshetError, Result};
pub use self::outlet::Outlet;
pub use self::signal::Signal;
pub use self::subscriber::{BoxSubscriber, Publisher, Subscriber, Subscription, SubscriptionRef};
pub use self::subscription::{DeferredSubscription, EmptySubscription};
