// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal consumers for freshet publishers.
//!
//! - [`SubscribeExt`] attaches callbacks and returns a [`SubscriptionHandle`]
//!   for demand and cancellation
//! - [`IntoStreamExt`] turns a run into a `futures` [`Stream`](futures::Stream)
//!   and offers `collect_values` / `for_each_value` for async code
//!
//! Both traits are implemented for every [`Publisher`](freshet_core::Publisher).

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
mod logging;

pub mod stream;
pub mod subscribe;

pub use self::stream::{IntoStreamExt, PublisherStream, DEFAULT_PREFETCH};
pub use self::subscribe::{SubscribeExt, SubscriptionHandle};
