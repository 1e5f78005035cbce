// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use freshet::prelude::*;
use freshet_test_utils::test_data::{owned, GIRL_GROUPS};
use freshet_test_utils::StepVerifier;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::test]
async fn test_create_from_just_and_subscribe() -> anyhow::Result<()> {
    // Arrange
    let girl_groups = Flux::just(GIRL_GROUPS);
    let announced = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&announced);

    // Act
    let handle = girl_groups.subscribe_next(move |group| {
        sink.lock()
            .unwrap()
            .push(format!("Here's some girl group: {group}"));
    });

    // Assert
    assert!(handle.is_terminated());
    assert_eq!(announced.lock().unwrap().len(), GIRL_GROUPS.len());
    assert_eq!(announced.lock().unwrap()[0], "Here's some girl group: Ive");

    StepVerifier::create(girl_groups)
        .expect_next_all(GIRL_GROUPS)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_create_from_array() -> anyhow::Result<()> {
    StepVerifier::create(Flux::from_array(GIRL_GROUPS))
        .expect_next_all(GIRL_GROUPS)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_create_from_iterable() -> anyhow::Result<()> {
    // Arrange
    let mut girl_group_list = Vec::new();
    for group in GIRL_GROUPS {
        girl_group_list.push(group.to_string());
    }

    // Act & Assert
    StepVerifier::create(Flux::from_vec(girl_group_list))
        .expect_next_all(owned(&GIRL_GROUPS))
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_create_from_lazy_iterator() -> anyhow::Result<()> {
    // Arrange
    let girl_groups = Flux::from_iter(GIRL_GROUPS.iter().map(|group| group.to_lowercase()));

    // Act & Assert
    StepVerifier::create(girl_groups)
        .expect_next("ive".to_string())
        .expect_next_count(5)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_create_range() -> anyhow::Result<()> {
    StepVerifier::create(Flux::<i64>::range(1, 5))
        .expect_next(1)
        .expect_next(2)
        .expect_next(3)
        .expect_next(4)
        .expect_next(5)
        .verify_complete()
        .await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_create_interval() -> anyhow::Result<()> {
    // Arrange
    let ticks = interval(Duration::from_secs(1), TokioScheduler).take(5);

    // Act & Assert
    StepVerifier::create(ticks)
        .expect_next_all([0, 1, 2, 3, 4])
        .verify_complete()
        .await?;
    Ok(())
}
