// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet_stream::Flux;
use freshet_test_utils::test_data::{owned, ANIMALS, CHARACTERS, FOODS, FRUITS};
use freshet_test_utils::{DemandProbe, StepVerifier, TestError, TestPublisher};
use std::collections::HashMap;

#[tokio::test]
async fn test_collect_list_emits_all_values_once() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_vec(owned(&FRUITS)).collect_list())
        .expect_next(owned(&FRUITS))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_collect_list_of_empty_source() -> anyhow::Result<()> {
    StepVerifier::create(Flux::<u32>::empty().collect_list())
        .expect_next(Vec::new())
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_collect_list_waits_for_demand() -> anyhow::Result<()> {
    StepVerifier::create_with_initial_request(Flux::just([1, 2, 3]).collect_list(), 0)
        .then_request(1)
        .expect_next(vec![1, 2, 3])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_collect_list_discards_values_on_error() -> anyhow::Result<()> {
    // Arrange
    let readings = vec![Ok(1), Ok(2), Err(TestError::new("disk full"))];

    // Act
    let error = StepVerifier::create(Flux::try_from_iter(readings).collect_list())
        .verify_error()
        .await?;

    // Assert
    assert_eq!(error.to_string(), "Source failure: test error: disk full");
    Ok(())
}

#[tokio::test]
async fn test_collect_map_pairs_characters_with_foods() -> anyhow::Result<()> {
    // Arrange
    let foods = Flux::just(CHARACTERS)
        .zip_with(Flux::just(FOODS))
        .collect_map_with(|(character, _)| *character, |(_, food)| food);
    let expected: HashMap<&str, &str> = [("IronMan", "Steak"), ("Hulk", "Grape"), ("Thor", "Beer")]
        .into_iter()
        .collect();

    // Act & Assert
    StepVerifier::create(foods)
        .expect_next(expected)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_collect_map_keeps_last_value_per_key() -> anyhow::Result<()> {
    // Arrange
    let by_initial = Flux::just(ANIMALS).collect_map(|animal| animal.chars().next());
    let expected: HashMap<Option<char>, &str> = [
        (Some('a'), "aardvark"),
        (Some('e'), "eagle"),
        (Some('k'), "kangaroo"),
    ]
    .into_iter()
    .collect();

    // Act & Assert
    StepVerifier::create(by_initial)
        .expect_next(expected)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_all_is_true_when_every_value_matches() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just(ANIMALS).all(|animal| animal.contains('a')))
        .expect_next(true)
        .verify_complete()
        .await?;

    StepVerifier::create(Flux::<u32>::empty().all(|_| false))
        .expect_next(true)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_all_stops_at_first_mismatch() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::<i64>::range(0, 1_000));

    // Act
    StepVerifier::create(Flux::from_publisher(probe.clone()).all(|n| *n < 3))
        .expect_next(false)
        .verify_complete()
        .await?;

    // Assert
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_any_is_true_on_first_match() -> anyhow::Result<()> {
    // Arrange
    let probe = DemandProbe::new(Flux::just(ANIMALS));

    // Act
    StepVerifier::create(Flux::from_publisher(probe.clone()).any(|animal| animal.starts_with('k')))
        .expect_next(true)
        .verify_complete()
        .await?;

    // Assert
    assert!(probe.was_cancelled());
    Ok(())
}

#[tokio::test]
async fn test_any_is_false_when_nothing_matches() -> anyhow::Result<()> {
    StepVerifier::create(Flux::just(FRUITS).any(|fruit| fruit.is_empty()))
        .expect_next(false)
        .verify_complete()
        .await?;

    StepVerifier::create(Flux::<u32>::empty().any(|_| true))
        .expect_next(false)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_reduction_waits_for_upstream_completion() -> anyhow::Result<()> {
    // Arrange
    let publisher = TestPublisher::new();
    publisher.next_all([3, 1, 2]);

    // Act
    let result = StepVerifier::create(Flux::from_publisher(publisher.clone()).collect_list())
        .with_timeout(std::time::Duration::from_millis(50))
        .verify_complete()
        .await;

    // Assert
    assert!(result.is_err());
    assert_eq!(publisher.requests(), vec![freshet_core::UNBOUNDED]);
    Ok(())
}
