// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the Freshet reactive engine.
//!
//! This crate provides the verification harness, hand-driven publishers and
//! fixture data used by the tests of every other crate in the workspace. It is
//! meant for development and testing only.
//!
//! # Key Types
//!
//! - [`StepVerifier`] - drives one run of a publisher through a script of
//!   expectations and demand actions, reporting the first mismatch
//! - [`TestPublisher`] - a publisher the test pushes values into by hand
//! - [`DemandProbe`] - records the requests and cancels a publisher receives
//! - [`Player`] and the [`test_data`] constants - shared fixtures
//!
//! # Example
//!
//! ```rust
//! use freshet_test_utils::{DemandProbe, StepVerifier, TestPublisher};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = TestPublisher::new();
//! source.next_all(["a", "b"]);
//! source.complete();
//!
//! let probe = DemandProbe::new(source);
//! StepVerifier::create_with_initial_request(probe.clone(), 1)
//!     .expect_next("a")
//!     .then_request(1)
//!     .expect_next("b")
//!     .verify_complete()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(probe.requests(), vec![1, 1]);
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]
pub mod demand_probe;
pub mod helpers;
pub mod player;
pub mod step_verifier;
pub mod test_data;
pub mod test_publisher;

pub use demand_probe::DemandProbe;
pub use helpers::record_signals;
pub use player::Player;
pub use step_verifier::{StepVerifier, VerifyError, DEFAULT_STEP_TIMEOUT};
pub use test_data::TestError;
pub use test_publisher::TestPublisher;
