// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Everything needed to build and subscribe to pipelines.

pub use crate::{Flux, Mono};
pub use freshet_core::{
    BoxSubscriber, FreshetError, Publisher, Result, Signal, Subscriber, Subscription,
    SubscriptionRef, UNBOUNDED,
};
pub use freshet_runtime::Scheduler;
