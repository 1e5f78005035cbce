// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Player {
    pub first_name: String,
    pub last_name: String,
}

impl Player {
    #[must_use]
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Parses `"First Last"`. Returns `None` without exactly one space.
    #[must_use]
    pub fn parse(full_name: &str) -> Option<Self> {
        let (first, last) = full_name.split_once(' ')?;
        if last.contains(' ') {
            return None;
        }
        Some(Self::new(first, last))
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player[{} {}]", self.first_name, self.last_name)
    }
}
