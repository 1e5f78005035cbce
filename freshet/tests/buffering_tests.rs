// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet::prelude::*;
use freshet_test_utils::test_data::{owned, ANIMALS, FRUITS};
use freshet_test_utils::StepVerifier;

#[tokio::test]
async fn test_buffer_fruits_in_threes() -> anyhow::Result<()> {
    // Arrange
    let buffered = Flux::just(FRUITS).buffer(3);

    // Act & Assert
    StepVerifier::create(buffered)
        .expect_next(vec!["apple", "orange", "banana"])
        .expect_next(vec!["kiwi", "strawberry"])
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_buffer_then_flat_map_on_workers() -> anyhow::Result<()> {
    // Arrange
    let shouted = Flux::just(FRUITS).buffer(3).flat_map(|batch| {
        Flux::from_vec(batch)
            .map(str::to_uppercase)
            .subscribe_on(TokioScheduler)
            .log("fruit-batch")
    });

    // Act
    let mut values = shouted.collect_values().await?;

    // Assert
    values.sort();
    let mut expected: Vec<String> = FRUITS.iter().map(|fruit| fruit.to_uppercase()).collect();
    expected.sort();
    assert_eq!(values, expected);
    Ok(())
}

#[tokio::test]
async fn test_collect_list_of_fruits() -> anyhow::Result<()> {
    // Arrange
    let fruit_list = Flux::from_vec(owned(&FRUITS)).collect_list();

    // Act & Assert
    StepVerifier::create(fruit_list)
        .expect_next(owned(&FRUITS))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_collect_map_by_first_letter() -> anyhow::Result<()> {
    // Arrange
    let animal_map = Flux::just(ANIMALS).collect_map(|animal| animal.chars().next().unwrap_or_default());

    // Act & Assert
    StepVerifier::create(animal_map)
        .expect_next_matches("three animals keyed by first letter", |map| {
            map.len() == 3
                && map.get(&'a') == Some(&"aardvark")
                && map.get(&'e') == Some(&"eagle")
                && map.get(&'k') == Some(&"kangaroo")
        })
        .verify_complete()
        .await?;
    Ok(())
}
