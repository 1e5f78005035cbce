// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_stream::Flux;
use freshet_test_utils::test_data::{ANIMALS, FRUITS};
use freshet_test_utils::{DemandProbe, StepVerifier, TestPublisher};

async fn wait_for_demand<T: Send + 'static>(publisher: &TestPublisher<T>) {
    while publisher.total_requested() == 0 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_merge_interleaves_in_arrival_order() -> anyhow::Result<()> {
    // Arrange
    let cities = TestPublisher::new();
    let parks = TestPublisher::new();
    let merged = Flux::from_publisher(cities.clone()).merge_with(Flux::from_publisher(parks.clone()));
    let verification = tokio::spawn(
        StepVerifier::create(merged)
            .expect_next_all(["Seoul", "Zion", "Paris", "Yosemite"])
            .verify_complete(),
    );
    wait_for_demand(&cities).await;
    wait_for_demand(&parks).await;

    // Act
    cities.next("Seoul");
    parks.next("Zion");
    cities.next("Paris");
    cities.complete();
    parks.next("Yosemite");
    parks.complete();

    // Assert
    verification.await??;
    Ok(())
}

#[tokio::test]
async fn test_merge_completes_after_every_source() -> anyhow::Result<()> {
    // Arrange
    let fruits = TestPublisher::new();
    let merged = Flux::merge(vec![
        Flux::from_publisher(fruits.clone()),
        Flux::just(ANIMALS),
    ]);
    let verification = tokio::spawn(
        StepVerifier::create(merged)
            .expect_next_count(ANIMALS.len())
            .expect_next_all(FRUITS)
            .verify_complete(),
    );
    wait_for_demand(&fruits).await;

    // Act
    fruits.next_all(FRUITS);
    fruits.complete();

    // Assert
    verification.await??;
    Ok(())
}

#[tokio::test]
async fn test_merge_wraps_source_error_and_cancels_the_rest() -> anyhow::Result<()> {
    // Arrange
    let healthy = TestPublisher::<&str>::new();
    let merged = Flux::merge(vec![
        Flux::from_publisher(healthy.clone()),
        Flux::error(FreshetError::source_failure("feed down")),
    ]);

    // Act
    let error = StepVerifier::create(merged).verify_error().await?;

    // Assert
    assert!(matches!(error, FreshetError::CoordinatorFailure { index: 1, .. }));
    assert!(matches!(error.root_cause(), FreshetError::SourceFailure { .. }));
    assert!(healthy.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_merge_of_no_sources_completes() -> anyhow::Result<()> {
    StepVerifier::create(Flux::<u32>::merge(Vec::new()))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_merge_broadcasts_demand_and_holds_surplus() -> anyhow::Result<()> {
    // Arrange
    let low = DemandProbe::new(Flux::<i64>::range(0, 10));
    let high = DemandProbe::new(Flux::<i64>::range(100, 10));
    let merged = Flux::from_publisher(low.clone()).merge_with(Flux::from_publisher(high.clone()));

    // Act
    StepVerifier::create_with_initial_request(merged, 3)
        .expect_next_all([0, 1, 2])
        .then_cancel()
        .verify()
        .await?;

    // Assert
    assert_eq!(low.requests(), vec![3]);
    assert_eq!(high.requests(), vec![3]);
    assert!(low.was_cancelled());
    assert!(high.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_merge_cancel_reaches_every_source() -> anyhow::Result<()> {
    // Arrange
    let left = TestPublisher::<u32>::new();
    let right = TestPublisher::<u32>::new();
    let merged = Flux::from_publisher(left.clone()).merge_with(Flux::from_publisher(right.clone()));

    // Act
    StepVerifier::create(merged).then_cancel().verify().await?;

    // Assert
    assert!(left.is_cancelled());
    assert!(right.is_cancelled());
    Ok(())
}
