// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_runtime::TokioScheduler;
use freshet_stream::{Flux, Mono};
use freshet_test_utils::test_data::{CITIES, FRUITS};
use freshet_test_utils::{DemandProbe, StepVerifier};

#[tokio::test]
async fn test_subscribe_on_delivers_from_spawned_task() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::just(CITIES));
    let cities = Flux::from_publisher(probe.clone()).subscribe_on(TokioScheduler);

    // Act
    StepVerifier::create(cities)
        .expect_next_all(CITIES)
        .verify_complete()
        .await?;

    // Assert
    assert_eq!(probe.subscriptions(), 1);
    assert_eq!(probe.requests(), vec![freshet_core::UNBOUNDED]);
    Ok(())
}

#[tokio::test]
async fn test_subscribe_on_replays_demand_recorded_before_subscription() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 10));
    let numbers = Flux::from_publisher(probe.clone()).subscribe_on(TokioScheduler);

    // Act
    StepVerifier::create_with_initial_request(numbers, 2)
        .then_request(1)
        .expect_next_all([0, 1, 2])
        .then_cancel()
        .verify()
        .await?;

    // Assert
    assert_eq!(probe.total_requested(), 3);
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_subscribe_on_skips_cancelled_run() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::just(FRUITS));
    let fruits = Flux::from_publisher(probe.clone()).subscribe_on(TokioScheduler);

    // Act
    StepVerifier::create(fruits).then_cancel().verify().await?;
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }

    // Assert
    assert_eq!(probe.subscriptions(), 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_mono_subscribe_on_multi_thread() -> anyhow::Result<()> {
    StepVerifier::create(Mono::just("Seoul").map(str::len).subscribe_on(TokioScheduler))
        .expect_next(5)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_log_passes_signals_and_demand_through() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::just(FRUITS));
    let fruits = Flux::from_publisher(probe.clone()).log("fruits");

    // Act
    StepVerifier::create_with_initial_request(fruits, 2)
        .expect_next_all(["apple", "orange"])
        .then_cancel()
        .verify()
        .await?;

    // Assert
    assert_eq!(probe.requests(), vec![2]);
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_log_forwards_errors() -> anyhow::Result<()> {
    let error = StepVerifier::create(
        Flux::<u32>::error(freshet_core::FreshetError::overflow("too many")).log("failing"),
    )
    .verify_error()
    .await?;

    assert_eq!(error.to_string(), "Overflow: too many");
    Ok(())
}
