// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Backpressured publisher pipelines.
//!
//! [`Flux`] (zero or more values) and [`Mono`] (at most one) are reusable
//! pipeline definitions built from the signal protocol of `freshet-core`.
//! Subscribing starts an independent run; values only move against demand
//! requested by the subscriber.
//!
//! ## Operator Categories
//!
//! ### Sources
//!
//! - [`Flux::just`], [`Flux::from_array`], [`Flux::from_vec`], [`Flux::from_iter`],
//!   [`Flux::try_from_iter`], [`Flux::range`], [`Flux::empty`], [`Flux::error`],
//!   [`Flux::never`]
//!
//! ### Transformation and filtering
//!
//! - [`map`](Flux::map), [`try_map`](Flux::try_map), [`do_on_next`](Flux::do_on_next)
//! - [`filter`](Flux::filter), [`distinct`](Flux::distinct), [`distinct_by`](Flux::distinct_by)
//! - [`skip`](Flux::skip), [`take`](Flux::take)
//! - [`buffer`](Flux::buffer)
//!
//! ### Reductions
//!
//! - [`collect_list`](Flux::collect_list), [`collect_map`](Flux::collect_map),
//!   [`all`](Flux::all), [`any`](Flux::any)
//!
//! ### Combination
//!
//! | Operator | Order | Completes |
//! |----------|-------|-----------|
//! | [`merge`](Flux::merge) | arrival | after every source |
//! | [`zip`](Flux::zip) | index | with the shortest source |
//! | [`first`](Flux::first) | winner's own | with the winner |
//! | [`flat_map`](Flux::flat_map) | arrival | after outer and every inner |
//!
//! A failing child of `merge`, `zip` or `flat_map` terminates the run with
//! [`FreshetError::CoordinatorFailure`](freshet_core::FreshetError::CoordinatorFailure)
//! carrying the child's index, and every other child is cancelled.
//!
//! ### Execution
//!
//! - [`subscribe_on`](Flux::subscribe_on) moves the subscription onto a
//!   [`Scheduler`](freshet_runtime::Scheduler) worker
//! - [`log`](Flux::log) traces every signal

#[macro_use]
mod logging;

mod aggregate;
mod buffer;
mod filter;
mod first;
mod flat_map;
mod flux;
mod log;
mod map;
mod merge;
mod mono;
pub mod prelude;
mod source;
mod subscribe_on;
mod take;
mod zip;

pub use self::flux::Flux;
pub use self::mono::Mono;
