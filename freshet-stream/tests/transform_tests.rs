// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_core::FreshetError;
use freshet_stream::Flux;
use freshet_test_utils::test_data::{owned, ANIMALS, FRUITS, PETS, PLAYER_NAMES};
use freshet_test_utils::{DemandProbe, Player, StepVerifier, TestError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn test_map_transforms_each_value() -> anyhow::Result<()> {
    // Arrange
    let names = Flux::just(ANIMALS).map(str::to_uppercase);

    // Act & Assert
    StepVerifier::create(names)
        .expect_next_all(["AARDVARK", "ELEPHANT", "KOALA", "EAGLE", "KANGAROO"].map(String::from))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_map_into_structured_values() -> anyhow::Result<()> {
    // Arrange
    let players = Flux::just(PLAYER_NAMES).map(|name| Player::parse(name));

    // Act & Assert
    StepVerifier::create(players)
        .expect_next(Player::parse("Michael Jordan"))
        .expect_next(Some(Player::new("Scottie", "Pippen")))
        .expect_next(Some(Player::new("Steve", "Kerr")))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_try_map_error_cancels_upstream() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(1, 10));
    let halves = Flux::from_publisher(probe.clone()).try_map(|n| {
        if n % 2 == 0 {
            Ok(n / 2)
        } else if n < 3 {
            Ok(n)
        } else {
            Err(TestError::new(format!("{n} is odd")))
        }
    });

    // Act
    let error = StepVerifier::create(halves)
        .expect_next_all([1, 1])
        .verify_error()
        .await?;

    // Assert
    assert!(matches!(error, FreshetError::TransformFailure(_)));
    assert_eq!(error.to_string(), "Transform failure: test error: 3 is odd");
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_do_on_next_sees_every_value() -> anyhow::Result<()> {
    // Arrange
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let fruits = Flux::just(FRUITS).do_on_next(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    StepVerifier::create(fruits)
        .expect_next_count(5)
        .verify_complete()
        .await?;

    // Assert
    assert_eq!(seen.load(Ordering::SeqCst), 5);
    Ok(())
}

#[tokio::test]
async fn test_filter_keeps_matching_values() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just(FRUITS).filter(|fruit| fruit.len() > 5))
        .expect_next_all(["orange", "banana", "strawberry"])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_filter_replenishes_demand_for_dropped_values() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 10));
    let evens = Flux::from_publisher(probe.clone()).filter(|n| n % 2 == 0);

    // Act
    StepVerifier::create_with_initial_request(evens, 2)
        .expect_next_all([0, 2])
        .then_cancel()
        .verify()
        .await?;

    // Assert
    assert_eq!(probe.requests(), vec![2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_distinct_drops_repeats() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just(PETS).distinct())
        .expect_next_all(["dog", "cat", "bird", "anteater"])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_distinct_by_key() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_vec(owned(&ANIMALS)).distinct_by(|animal| animal.len()))
        .expect_next_all(owned(&["aardvark", "koala"]))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_distinct_state_is_per_run() -> anyhow::Result<()> {
    // Arrange
    let pets = Flux::just(PETS).distinct();

    // Act & Assert
    for _ in 0..2 {
        StepVerifier::create(pets.clone())
            .expect_next_count(4)
            .verify_complete()
            .await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_skip_drops_leading_values() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just(FRUITS).skip(3))
        .expect_next_all(["kiwi", "strawberry"])
        .verify_complete()
        .await?;

    StepVerifier::create(Flux::just(FRUITS).skip(10))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_take_caps_upstream_demand() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 100));
    let first_two = Flux::from_publisher(probe.clone()).take(2);

    // Act
    StepVerifier::create(first_two)
        .expect_next_all([0, 1])
        .verify_complete()
        .await?;

    // Assert
    assert_eq!(probe.requests(), vec![2]);
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_take_more_than_available_completes_with_source() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just(FRUITS).take(10))
        .expect_next_count(5)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_take_zero_never_requests() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 100));

    // Act
    StepVerifier::create(Flux::from_publisher(probe.clone()).take(0))
        .verify_complete()
        .await?;

    // Assert
    assert_eq!(probe.total_requested(), 0);
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_take_splits_demand_across_requests() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 100));

    // Act
    StepVerifier::create_with_initial_request(Flux::from_publisher(probe.clone()).take(3), 2)
        .expect_next_all([0, 1])
        .then_request(5)
        .expect_next(2)
        .verify_complete()
        .await?;

    // Assert
    assert_eq!(probe.requests(), vec![2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_buffer_groups_values_and_flushes_remainder() -> anyhow::Result<()> {
    StepVerifier::create(Flux::<i64>::range(1, 5).buffer(2))
        .expect_next(vec![1, 2])
        .expect_next(vec![3, 4])
        .expect_next(vec![5])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_buffer_requests_whole_windows() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 9));

    // Act
    StepVerifier::create_with_initial_request(Flux::from_publisher(probe.clone()).buffer(3), 1)
        .expect_next(vec![0, 1, 2])
        .then_cancel()
        .verify()
        .await?;

    // Assert
    assert_eq!(probe.requests(), vec![3]);
    Ok(())
}

#[tokio::test]
async fn test_buffer_drops_partial_window_on_error() -> anyhow::Result<()> {
    // Arrange
    let readings = vec![Ok(1), Ok(2), Ok(3), Err(TestError::new("sensor offline"))];

    // Act & Assert
    StepVerifier::create(Flux::try_from_iter(readings).buffer(2))
        .expect_next(vec![1, 2])
        .verify_error()
        .await?;
    Ok(())
}

#[test]
#[should_panic(expected = "at least 1")]
fn test_buffer_of_zero_panics() {
    let _ = Flux::<i64>::range(0, 3).buffer(0);
}
