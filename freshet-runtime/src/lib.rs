// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Runtime seam of the Freshet engine.
//!
//! Time-driven stages never call an executor directly. They receive a
//! [`Scheduler`], ask it for a [`Timer`] and spawn their waits through it, so
//! the same pipeline runs on tokio or smol, and tests can drive it with tokio's
//! paused clock.

pub mod impls;
pub mod scheduler;
pub mod timer;

pub use scheduler::{spawn_until_cancelled, Scheduler};
pub use timer::Timer;

#[cfg(feature = "runtime-tokio")]
pub use impls::tokio::{TokioScheduler, TokioTimer};

#[cfg(feature = "runtime-smol")]
pub use impls::smol::{SmolScheduler, SmolTimer};

/// Scheduler used when a stage is not given one explicitly.
#[cfg(feature = "runtime-tokio")]
pub type DefaultScheduler = TokioScheduler;

/// Scheduler used when a stage is not given one explicitly.
#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
pub type DefaultScheduler = SmolScheduler;
