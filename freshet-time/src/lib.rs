// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-driven sources and operators for [`Flux`](freshet_stream::Flux).
//!
//! Every stage here takes a [`Scheduler`](freshet_runtime::Scheduler): waits are
//! spawned on it, measured with its [`Timer`](freshet_runtime::Timer), and raced
//! against a per-run cancellation token so that nothing fires into a run that
//! has already ended. Durations are measured from the moment a run subscribes,
//! not from when the pipeline was built.
//!
//! # Overview
//!
//! - [`interval`] / [`interval_with_delay`] - periodic `0, 1, 2, …` ticks
//! - [`SkipForExt`] - `.skip_for(duration, scheduler)`
//! - [`TakeForExt`] - `.take_for(duration, scheduler)`
//! - [`DelayElementsExt`] - `.delay_elements(duration, scheduler)`
//! - [`DelaySubscriptionExt`] - `.delay_subscription(duration, scheduler)`
//!
//! # Example
//!
//! ```rust
//! use freshet_runtime::TokioScheduler;
//! use freshet_test_utils::StepVerifier;
//! use freshet_time::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let ticks = interval(Duration::from_millis(100), TokioScheduler).take(3);
//!
//! StepVerifier::create(ticks)
//!     .expect_next_all([0, 1, 2])
//!     .verify_complete()
//!     .await
//!     .unwrap();
//! # }
//! ```

mod delay_elements;
mod delay_subscription;
mod interval;
mod skip_for;
mod take_for;

pub mod prelude;

pub use delay_elements::DelayElementsExt;
pub use delay_subscription::DelaySubscriptionExt;
pub use interval::{interval, interval_with_delay};
pub use skip_for::SkipForExt;
pub use take_for::TakeForExt;
