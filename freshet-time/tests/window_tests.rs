// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_runtime::TokioScheduler;
use freshet_stream::Flux;
use freshet_test_utils::test_data::PARKS;
use freshet_test_utils::{DemandProbe, StepVerifier, TestPublisher};
use freshet_time::prelude::*;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_skip_for_drops_early_values() -> anyhow::Result<()> {
    // Arrange
    let late = Flux::just(["one", "two", "skip a few", "ninety nine", "one hundred"])
        .delay_elements(Duration::from_secs(1), TokioScheduler)
        .skip_for(Duration::from_secs(4), TokioScheduler);

    // Act & Assert
    StepVerifier::create(late)
        .expect_next_all(["ninety nine", "one hundred"])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_skip_for_replenishes_demand() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 5));
    let skipped = Flux::from_publisher(probe.clone())
        .skip_for(Duration::from_millis(10), TokioScheduler);

    // Act
    StepVerifier::create_with_initial_request(skipped, 2)
        .verify_complete()
        .await?;

    // Assert
    assert_eq!(probe.requests(), vec![2, 1, 1, 1, 1, 1]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_skip_for_passes_errors_through() -> anyhow::Result<()> {
    let error = StepVerifier::create(
        Flux::<u32>::error(FreshetError::source_failure("boom"))
            .skip_for(Duration::from_secs(1), TokioScheduler),
    )
    .verify_error()
    .await?;

    assert!(matches!(error, FreshetError::SourceFailure { .. }));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_take_for_keeps_values_inside_the_window() -> anyhow::Result<()> {
    // Arrange
    let parks = Flux::just(PARKS)
        .delay_elements(Duration::from_secs(1), TokioScheduler)
        .take_for(Duration::from_millis(3500), TokioScheduler);

    // Act & Assert
    StepVerifier::create(parks)
        .expect_next_all(["Yellowstone", "Yosemite", "Grand Canyon"])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_take_for_cancels_upstream_at_deadline() -> anyhow::Result<()> {
    // Arrange
    let source = TestPublisher::<u32>::new();
    let windowed = Flux::from_publisher(source.clone())
        .take_for(Duration::from_millis(200), TokioScheduler);
    let verification = tokio::spawn(
        StepVerifier::create(windowed)
            .expect_next(1)
            .verify_complete(),
    );
    while source.total_requested() == 0 {
        tokio::task::yield_now().await;
    }

    // Act
    source.next(1);

    // Assert
    verification.await??;
    assert!(source.is_cancelled());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_take_for_completes_early_with_its_source() -> anyhow::Result<()> {
    // Arrange
    let start = tokio::time::Instant::now();
    let parks = Flux::just(PARKS).take_for(Duration::from_secs(10), TokioScheduler);

    // Act
    StepVerifier::create(parks)
        .expect_next_count(PARKS.len())
        .verify_complete()
        .await?;

    // Assert
    assert!(start.elapsed() < Duration::from_secs(10));
    Ok(())
}
