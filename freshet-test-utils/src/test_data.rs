// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fixed data sets shared by the operator tests.

use thiserror::Error;

pub const FRUITS: [&str; 5] = ["apple", "orange", "banana", "kiwi", "strawberry"];

pub const ANIMALS: [&str; 5] = ["aardvark", "elephant", "koala", "eagle", "kangaroo"];

pub const GIRL_GROUPS: [&str; 6] = ["Ive", "Lesserafim", "Newjeans", "G-IDLE", "ITZY", "BlackPink"];

pub const CITIES: [&str; 6] = ["NewYork", "London", "Paris", "Tyokyo", "Seoul", "Beijing"];

pub const PARKS: [&str; 5] = [
    "Yellowstone",
    "Yosemite",
    "Grand Canyon",
    "Zion",
    "Grand Teton",
];

pub const CHARACTERS: [&str; 3] = ["IronMan", "Hulk", "Thor"];

pub const FOODS: [&str; 3] = ["Steak", "Grape", "Beer"];

pub const PETS: [&str; 6] = ["dog", "cat", "bird", "dog", "bird", "anteater"];

pub const PLAYER_NAMES: [&str; 3] = ["Michael Jordan", "Scottie Pippen", "Steve Kerr"];

/// Owned copy of a fixture, for sources that need `String` values.
#[must_use]
pub fn owned(data: &[&str]) -> Vec<String> {
    data.iter().map(|s| (*s).to_string()).collect()
}

/// Error type for exercising fallible user functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("test error: {0}")]
pub struct TestError(pub String);

impl TestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
