// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_stream::{Flux, Mono};
use freshet_test_utils::test_data::{ANIMALS, PLAYER_NAMES};
use freshet_test_utils::{DemandProbe, Player, StepVerifier, TestPublisher};

#[tokio::test]
async fn test_flat_map_flattens_every_inner() -> anyhow::Result<()> {
    // Arrange
    let letters = Flux::just(ANIMALS)
        .flat_map(|animal| Flux::from_vec(animal.chars().collect()))
        .collect_list()
        .map(|letters| letters.len());

    // Act & Assert
    StepVerifier::create(letters)
        .expect_next(ANIMALS.iter().map(|animal| animal.len()).sum())
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_flat_map_with_mono_inners() -> anyhow::Result<()> {
    // Arrange
    let players = Flux::just(PLAYER_NAMES)
        .flat_map(|name| Mono::just(name).map(Player::parse).into_flux())
        .collect_list()
        .map(|mut players| {
            players.sort();
            players
        });

    // Act & Assert
    StepVerifier::create(players)
        .expect_next(vec![
            Player::parse("Michael Jordan"),
            Player::parse("Scottie Pippen"),
            Player::parse("Steve Kerr"),
        ])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_flat_map_interleaves_inners_in_arrival_order() -> anyhow::Result<()> {
    // Arrange
    let first = TestPublisher::new();
    let second = TestPublisher::new();
    let inners = vec![first.clone(), second.clone()];
    let flattened = Flux::<i64>::range(0, 2).flat_map(move |i| {
        let index = usize::try_from(i).unwrap_or_default();
        Flux::from_publisher(inners[index].clone())
    });
    let verification = tokio::spawn(
        StepVerifier::create(flattened)
            .expect_next_all(["b1", "a1", "a2", "b2"])
            .verify_complete(),
    );
    while second.total_requested() == 0 {
        tokio::task::yield_now().await;
    }

    // Act
    second.next("b1");
    first.next("a1");
    first.next("a2");
    first.complete();
    second.next("b2");
    second.complete();

    // Assert
    verification.await??;
    Ok(())
}

#[tokio::test]
async fn test_flat_map_concurrency_limits_outer_demand() -> anyhow::Result<()> {
    // Arrange
    let outer = DemandProbe::new(Flux::<i64>::range(0, 10));
    let flattened = Flux::from_publisher(outer.clone())
        .flat_map_with_concurrency(|n| Flux::just([n * 10]), 2);

    // Act
    StepVerifier::create(flattened)
        .expect_next_count(10)
        .verify_complete()
        .await?;

    // Assert
    let requests = outer.requests();
    assert_eq!(requests.first(), Some(&2));
    assert!(requests[1..].iter().all(|n| *n == 1));
    Ok(())
}

#[tokio::test]
async fn test_flat_map_concurrency_waits_for_inner_completion() -> anyhow::Result<()> {
    // Arrange
    let outer = DemandProbe::new(Flux::<i64>::range(0, 5));
    let inner = TestPublisher::<i64>::new();
    let pending = inner.clone();
    let flattened = Flux::from_publisher(outer.clone())
        .flat_map_with_concurrency(move |_| Flux::from_publisher(pending.clone()), 1);

    // Act
    StepVerifier::create(flattened)
        .then_cancel()
        .verify()
        .await?;

    // Assert
    assert_eq!(outer.requests(), vec![1]);
    assert_eq!(inner.subscriptions(), 1);
    assert!(inner.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_flat_map_wraps_inner_error_with_its_ordinal() -> anyhow::Result<()> {
    // Arrange
    let flattened = Flux::<i64>::range(0, 5).flat_map(|n| {
        if n == 2 {
            Flux::error(FreshetError::source_failure("lookup failed"))
        } else {
            Flux::just([n])
        }
    });

    // Act
    let error = StepVerifier::create(flattened).verify_error().await?;

    // Assert
    assert!(matches!(error, FreshetError::CoordinatorFailure { index: 2, .. }));
    Ok(())
}

#[tokio::test]
async fn test_flat_map_forwards_outer_error_as_is() -> anyhow::Result<()> {
    // Arrange
    let flattened = Flux::<i64>::error(FreshetError::source_failure("no ids"))
        .flat_map(|n| Flux::just([n]));

    // Act
    let error = StepVerifier::create(flattened).verify_error().await?;

    // Assert
    assert!(matches!(error, FreshetError::SourceFailure { .. }));
    Ok(())
}

#[tokio::test]
async fn test_flat_map_of_empty_outer_completes() -> anyhow::Result<()> {
    StepVerifier::create(Flux::<i64>::empty().flat_map(|n| Flux::just([n])))
        .verify_complete()
        .await?;
    Ok(())
}

#[test]
#[should_panic(expected = "at least 1")]
fn test_flat_map_concurrency_of_zero_panics() {
    let _ = Flux::<i64>::range(0, 3).flat_map_with_concurrency(|n| Flux::just([n]), 0);
}
